//! DOM surfaces: the editor element tree inside a mount point.
//!
//! ```text
//! <div class="sqlpad-editor lang-sql" style="--sqlpad-...">
//!   <div class="sqlpad-gutter" contenteditable="false">1\n2</div>
//!   <div class="sqlpad-content" contenteditable="true">SELECT 1</div>
//! </div>
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use smol_str::{SmolStr, format_smolstr};
use sqlpad_editor_core::{
    EditorState, EngineError, EngineSettings, MountId, Surface, SurfaceHost, TextBuffer,
};
use wasm_bindgen::{JsCast, JsValue};

use crate::color::theme_css_vars;
use crate::cursor::restore_dom_selection;

/// Attribute carrying a mount point's identity.
pub const MOUNT_ATTRIBUTE: &str = "data-sqlpad-mount";

fn unavailable(context: &str, err: JsValue) -> EngineError {
    EngineError::SurfaceUnavailable(format_smolstr!("{context}: {err:?}"))
}

/// A DOM element editor surfaces attach to.
#[derive(Clone, Debug)]
pub struct DomParent {
    element: web_sys::Element,
    mount: MountId,
}

impl DomParent {
    /// Wrap `element`, tagging it with a mount id if it has none.
    pub fn new(element: web_sys::Element) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);

        let id = match element.get_attribute(MOUNT_ATTRIBUTE) {
            Some(id) => SmolStr::new(id),
            None => {
                let id = format_smolstr!("sqlpad-{}", NEXT.fetch_add(1, Ordering::Relaxed));
                if let Err(err) = element.set_attribute(MOUNT_ATTRIBUTE, &id) {
                    tracing::warn!(target: "sql_editor", error = ?err, "could not tag mount point");
                }
                id
            }
        };

        Self {
            element,
            mount: MountId::new(id),
        }
    }

    pub fn element(&self) -> &web_sys::Element {
        &self.element
    }
}

impl SurfaceHost for DomParent {
    type Surface = DomSurface;

    fn mount_id(&self) -> MountId {
        self.mount.clone()
    }

    fn create_surface(&self, settings: &EngineSettings) -> Result<DomSurface, EngineError> {
        if !self.element.is_connected() {
            return Err(EngineError::SurfaceUnavailable(SmolStr::new_static(
                "mount point is not connected to a document",
            )));
        }
        let document = self
            .element
            .owner_document()
            .ok_or_else(|| EngineError::SurfaceUnavailable(SmolStr::new_static("no document")))?;

        let create_div = |class: &str| -> Result<web_sys::HtmlElement, EngineError> {
            let element = document
                .create_element("div")
                .map_err(|e| unavailable("create_element failed", e))?;
            element.set_class_name(class);
            element
                .dyn_into::<web_sys::HtmlElement>()
                .map_err(|e| unavailable("not an HtmlElement", e.into()))
        };

        let root = create_div("sqlpad-editor")?;
        let gutter = create_div("sqlpad-gutter")?;
        let content = create_div("sqlpad-content")?;

        configure_root(&root, settings).map_err(|e| unavailable("styling failed", e))?;
        configure_gutter(&gutter, settings).map_err(|e| unavailable("styling failed", e))?;
        configure_content(&content, settings).map_err(|e| unavailable("styling failed", e))?;

        root.append_child(&gutter)
            .and_then(|_| root.append_child(&content))
            .and_then(|_| self.element.append_child(&root))
            .map_err(|e| unavailable("append_child failed", e))?;

        tracing::trace!(target: "sql_editor", mount = %self.mount, "surface attached");
        Ok(DomSurface {
            root,
            gutter,
            content,
            painted_lines: 0,
        })
    }
}

fn configure_root(root: &web_sys::HtmlElement, settings: &EngineSettings) -> Result<(), JsValue> {
    if let Some(language) = &settings.language {
        root.class_list().add_1(&format!("lang-{}", language.name))?;
    }
    if settings.highlight_active_line {
        root.class_list().add_1("sqlpad-highlight-active-line")?;
    }
    if settings.bracket_matching {
        root.class_list().add_1("sqlpad-bracket-matching")?;
    }

    let style = root.style();
    for (name, value) in theme_css_vars(&settings.theme) {
        style.set_property(name, &value)?;
    }
    style.set_property("width", &format!("{}px", settings.theme.width))?;
    style.set_property("height", &format!("{}px", settings.theme.height))?;
    style.set_property("display", "flex")?;
    style.set_property("background", "var(--sqlpad-background)")?;
    style.set_property("color", "var(--sqlpad-foreground)")?;
    style.set_property("font-family", "monospace")?;
    style.set_property("font-size", "var(--sqlpad-font-size)")?;
    style.set_property("line-height", "var(--sqlpad-line-height)")?;
    style.set_property("overflow", "auto")?;
    Ok(())
}

fn configure_gutter(gutter: &web_sys::HtmlElement, settings: &EngineSettings) -> Result<(), JsValue> {
    gutter.set_attribute("contenteditable", "false")?;
    gutter.set_attribute("aria-hidden", "true")?;
    let style = gutter.style();
    style.set_property("white-space", "pre")?;
    style.set_property("text-align", "right")?;
    style.set_property("padding", "0 0.5em")?;
    style.set_property("user-select", "none")?;
    style.set_property("background", "var(--sqlpad-gutter)")?;
    if !settings.line_numbers {
        style.set_property("display", "none")?;
    }
    Ok(())
}

fn configure_content(content: &web_sys::HtmlElement, settings: &EngineSettings) -> Result<(), JsValue> {
    content.set_attribute("contenteditable", "true")?;
    content.set_attribute("spellcheck", "false")?;
    content.set_attribute("role", "textbox")?;
    content.set_attribute("aria-multiline", "true")?;
    let style = content.style();
    style.set_property("flex", "1")?;
    style.set_property("outline", "none")?;
    style.set_property("padding", "0 0.5em")?;
    style.set_property("tab-size", &settings.tab_size.to_string())?;
    style.set_property(
        "white-space",
        if settings.line_wrapping { "pre-wrap" } else { "pre" },
    )?;
    Ok(())
}

/// The editor element tree for one engine.
#[derive(Debug)]
pub struct DomSurface {
    root: web_sys::HtmlElement,
    gutter: web_sys::HtmlElement,
    content: web_sys::HtmlElement,
    painted_lines: usize,
}

impl DomSurface {
    /// The editable element, for attaching event listeners.
    pub fn content(&self) -> &web_sys::HtmlElement {
        &self.content
    }

    pub fn root(&self) -> &web_sys::HtmlElement {
        &self.root
    }
}

impl Surface for DomSurface {
    fn paint(&mut self, state: &EditorState, settings: &EngineSettings) {
        let text = state.doc_string();
        if self.content.text_content().as_deref() != Some(text.as_str()) {
            self.content.set_text_content(Some(&text));
        }

        let lines = state.doc().len_lines();
        if settings.line_numbers && lines != self.painted_lines {
            let numbers: Vec<String> = (1..=lines).map(|n| n.to_string()).collect();
            self.gutter.set_text_content(Some(&numbers.join("\n")));
            self.painted_lines = lines;
        }

        if settings.highlight_active_line {
            let active = state.doc().line_of_char(state.selection().head);
            if let Err(err) = self
                .root
                .set_attribute("data-active-line", &(active + 1).to_string())
            {
                tracing::debug!(target: "sql_editor", error = ?err, "could not mark active line");
            }
        }

        if let Err(err) = restore_dom_selection(&self.content, &text, state.selection()) {
            tracing::debug!(target: "sql_editor", error = ?err, "could not restore selection");
        }
    }

    fn remove(self) {
        self.root.remove();
    }
}
