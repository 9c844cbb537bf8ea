//! SqlEditor - the editor hook exposed to JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use sqlpad_editor_browser::{
    DomEditorHook, EditorConfiguration, EditorEvents, EditorListeners, InputIntent, KeyCombo,
    KeydownResult, MountRegistry, RenderOutcome, Selection, SelectorBinding, TextCallback,
    TransactionSpec, platform, platform_settings,
};

use crate::types::{JsEditorParams, JsEditorSettings};

/// State shared between the wrapper and its DOM listeners.
struct EditorShared {
    hook: RefCell<DomEditorHook>,
}

/// A SQL editor bound to a CSS selector.
///
/// Call `render` whenever the host re-renders with the current parameters.
/// The editor is created on the first render and recreated only when the
/// mount point, the settings or the initial document change.
#[wasm_bindgen]
pub struct SqlEditor {
    shared: Rc<EditorShared>,
    listeners: Option<(web_sys::HtmlElement, EditorListeners)>,
}

#[wasm_bindgen]
impl SqlEditor {
    /// Create a hook for the element matching `selector`. Nothing is mounted
    /// until the first `render`.
    #[wasm_bindgen(constructor)]
    pub fn new(selector: &str) -> Self {
        let hook = DomEditorHook::new(selector, SelectorBinding::new(), MountRegistry::global())
            .with_settings(platform_settings());
        Self {
            shared: Rc::new(EditorShared {
                hook: RefCell::new(hook),
            }),
            listeners: None,
        }
    }

    /// Render with `{ code, readonly, onChange, onExecuteQuery }`.
    ///
    /// Returns `"created"`, `"recreated"` or `"unchanged"`.
    #[wasm_bindgen]
    pub fn render(&mut self, params: JsValue) -> Result<String, JsError> {
        let data: JsEditorParams = if params.is_undefined() || params.is_null() {
            JsEditorParams::default()
        } else {
            serde_wasm_bindgen::from_value(params.clone())
                .map_err(|e| JsError::new(&format!("Invalid render params: {}", e)))?
        };

        let mut config = EditorConfiguration::new(data.code).readonly(data.readonly);
        config.on_change = read_callback(&params, "onChange");
        config.on_execute = read_callback(&params, "onExecuteQuery");

        let result = self.shared.hook.try_borrow_mut().map_err(|_| busy())?.render(config);
        self.sync_listeners();

        let outcome = result.map_err(|e| JsError::new(&e.to_string()))?;
        Ok(match outcome {
            RenderOutcome::Created => "created",
            RenderOutcome::Recreated => "recreated",
            RenderOutcome::Unchanged => "unchanged",
        }
        .to_string())
    }

    /// Destroy the editor. Safe to call when nothing is mounted.
    #[wasm_bindgen]
    pub fn unmount(&mut self) -> Result<(), JsError> {
        self.listeners = None;
        self.shared
            .hook
            .try_borrow_mut()
            .map_err(|_| busy())?
            .unmount()
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Busy means mid-dispatch, which only happens on a live editor.
    #[wasm_bindgen(js_name = isLive)]
    pub fn is_live(&self) -> bool {
        self.shared
            .hook
            .try_borrow()
            .map(|hook| hook.manager().is_live())
            .unwrap_or(true)
    }

    /// Current document, or undefined when nothing is mounted.
    #[wasm_bindgen(js_name = getDocument)]
    pub fn get_document(&self) -> Result<Option<String>, JsError> {
        let hook = self.shared.hook.try_borrow().map_err(|_| busy())?;
        Ok(hook.manager().document())
    }

    /// Run the execute-query command. Returns false when there is no
    /// callback or no editor.
    #[wasm_bindgen(js_name = executeQuery)]
    pub fn execute_query(&self) -> Result<bool, JsError> {
        let hook = self.shared.hook.try_borrow().map_err(|_| busy())?;
        Ok(hook.manager().execute_query())
    }

    #[wasm_bindgen(js_name = getSettings)]
    pub fn get_settings(&self) -> Result<JsEditorSettings, JsError> {
        let hook = self.shared.hook.try_borrow().map_err(|_| busy())?;
        Ok(JsEditorSettings::from(hook.settings()))
    }

    /// Replace the provider settings. Takes effect on the next `render`.
    #[wasm_bindgen(js_name = setSettings)]
    pub fn set_settings(&mut self, settings: JsEditorSettings) -> Result<(), JsError> {
        let settings = settings.into_settings(platform().mac);
        self.shared
            .hook
            .try_borrow_mut()
            .map_err(|_| busy())?
            .set_settings(settings);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn focus(&self) {
        if let Some(content) = self.content() {
            let _ = content.focus();
        }
    }
}

impl SqlEditor {
    fn content(&self) -> Option<web_sys::HtmlElement> {
        let hook = self.shared.hook.try_borrow().ok()?;
        let instance = hook.manager().instance().filter(|instance| instance.is_live())?;
        let engine = instance.engine()?;
        Some(engine.surface().content().clone())
    }

    /// Keep exactly one listener set, on the live editor's content element.
    fn sync_listeners(&mut self) {
        let Some(content) = self.content() else {
            self.listeners = None;
            return;
        };
        if matches!(&self.listeners, Some((bound, _)) if *bound == content) {
            return;
        }
        tracing::debug!(target: "sql_editor", "binding listeners");
        let listeners = EditorListeners::attach(&content, self.shared.clone());
        self.listeners = Some((content, listeners));
    }
}

impl EditorEvents for EditorShared {
    fn document(&self) -> Option<String> {
        self.hook.try_borrow().ok()?.manager().document()
    }

    fn selection(&self) -> Option<Selection> {
        let hook = self.hook.try_borrow().ok()?;
        hook.manager().editor_state().map(|state| state.selection())
    }

    fn keydown(&self, combo: &KeyCombo) -> KeydownResult {
        match self.hook.try_borrow_mut() {
            Ok(mut hook) => hook.manager_mut().handle_key(combo),
            Err(_) => KeydownResult::NotHandled,
        }
    }

    fn before_input(&self, intent: &InputIntent) -> bool {
        match self.hook.try_borrow_mut() {
            Ok(mut hook) => hook.manager_mut().handle_input(intent),
            Err(_) => false,
        }
    }

    fn select(&self, selection: Selection) {
        let Ok(mut hook) = self.hook.try_borrow_mut() else {
            return;
        };
        if let Err(err) = hook.manager_mut().update(TransactionSpec::new().select(selection)) {
            tracing::debug!(target: "sql_editor", error = %err, "ignoring DOM selection");
        }
    }
}

fn busy() -> JsError {
    JsError::new("SqlEditor is busy: called from inside one of its own callbacks")
}

/// Wrap a JS function found at `params[name]` as a text callback.
fn read_callback(params: &JsValue, name: &'static str) -> Option<TextCallback> {
    if !params.is_object() {
        return None;
    }
    let function = js_sys::Reflect::get(params, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()?;
    Some(Rc::new(move |text: &str| {
        if let Err(err) = function.call1(&JsValue::NULL, &JsValue::from_str(text)) {
            tracing::warn!(target: "sql_editor", callback = name, error = ?err, "callback threw");
        }
    }))
}
