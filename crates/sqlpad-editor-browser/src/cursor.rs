//! DOM Selection API handling.
//!
//! The content element holds the document as a single text node, so DOM
//! points map to char offsets by counting UTF-16 units from the start of the
//! content element.

use sqlpad_editor_core::Selection;
use wasm_bindgen::JsValue;

use crate::offsets::{char_to_utf16, utf16_to_char};

/// Convert a DOM point inside `content` to a char offset into `text`.
///
/// Returns None when the point lies outside the content element.
pub fn dom_point_to_char(
    content: &web_sys::Node,
    node: &web_sys::Node,
    offset: u32,
    text: &str,
) -> Option<usize> {
    if !content.contains(Some(node)) {
        return None;
    }

    // A point on the container itself counts child nodes, not characters.
    if node.is_same_node(Some(content)) {
        return Some(if offset == 0 { 0 } else { text.chars().count() });
    }

    let mut preceding_utf16 = 0;
    let mut child = content.first_child();
    while let Some(current) = child {
        if current.is_same_node(Some(node)) || current.contains(Some(node)) {
            break;
        }
        preceding_utf16 += current
            .text_content()
            .map(|t| t.encode_utf16().count())
            .unwrap_or(0);
        child = current.next_sibling();
    }

    Some(utf16_to_char(text, preceding_utf16 + offset as usize))
}

/// Read the DOM selection as a char selection, if it lies within `content`.
pub fn read_dom_selection(content: &web_sys::HtmlElement, text: &str) -> Option<Selection> {
    let selection = web_sys::window()?.get_selection().ok()??;
    let anchor_node = selection.anchor_node()?;
    let focus_node = selection.focus_node()?;

    let anchor = dom_point_to_char(content, &anchor_node, selection.anchor_offset(), text)?;
    let head = dom_point_to_char(content, &focus_node, selection.focus_offset(), text)?;
    Some(Selection::new(anchor, head))
}

fn dom_point_for_char(content: &web_sys::HtmlElement, text: &str, offset: usize) -> (web_sys::Node, u32) {
    match content.first_child() {
        Some(text_node) => (text_node, char_to_utf16(text, offset) as u32),
        None => (content.clone().into(), 0),
    }
}

/// Whether `content` currently has keyboard focus.
pub fn has_focus(content: &web_sys::HtmlElement) -> bool {
    content
        .owner_document()
        .and_then(|document| document.active_element())
        .is_some_and(|active| {
            let active: &web_sys::Node = active.as_ref();
            active.is_same_node(Some(content.as_ref()))
        })
}

/// Put the DOM selection at `selection` within `content`.
///
/// Does nothing when the content element is not focused or the DOM already
/// shows that selection.
pub fn restore_dom_selection(
    content: &web_sys::HtmlElement,
    text: &str,
    selection: Selection,
) -> Result<(), JsValue> {
    if !has_focus(content) {
        return Ok(());
    }
    if read_dom_selection(content, text) == Some(selection) {
        return Ok(());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let dom_selection = window
        .get_selection()?
        .ok_or_else(|| JsValue::from_str("no selection object"))?;

    let (anchor_node, anchor_offset) = dom_point_for_char(content, text, selection.anchor);
    let (focus_node, focus_offset) = dom_point_for_char(content, text, selection.head);

    tracing::trace!(
        target: "sql_editor",
        anchor = selection.anchor,
        head = selection.head,
        "restoring DOM selection"
    );
    dom_selection.set_base_and_extent(&anchor_node, anchor_offset, &focus_node, focus_offset)
}
