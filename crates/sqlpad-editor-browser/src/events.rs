//! Browser event handling for the editor.
//!
//! Converts `beforeinput`, `keydown`, composition and `selectionchange`
//! events into core intents and forwards them to an `EditorEvents` sink.
//! The DOM text only ever changes through surface paints, except while an
//! IME composition is in progress.

use std::cell::Cell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use sqlpad_editor_core::{
    InputIntent, InputType, Key, KeyCombo, KeydownResult, Modifiers, Selection,
};
use wasm_bindgen::prelude::*;

use crate::cursor::{dom_point_to_char, read_dom_selection};

// === StaticRange binding ===
//
// web-sys doesn't expose StaticRange, which InputEvent.getTargetRanges()
// returns.

#[wasm_bindgen]
extern "C" {
    pub type StaticRange;

    #[wasm_bindgen(method, getter, structural)]
    pub fn startContainer(this: &StaticRange) -> web_sys::Node;

    #[wasm_bindgen(method, getter, structural)]
    pub fn startOffset(this: &StaticRange) -> u32;

    #[wasm_bindgen(method, getter, structural)]
    pub fn endContainer(this: &StaticRange) -> web_sys::Node;

    #[wasm_bindgen(method, getter, structural)]
    pub fn endOffset(this: &StaticRange) -> u32;
}

// === Event conversion ===

/// Parse a W3C Input Events `inputType` string.
pub fn parse_browser_input_type(s: &str) -> InputType {
    match s {
        "insertText" => InputType::InsertText,
        "insertCompositionText" => InputType::InsertCompositionText,
        "insertLineBreak" => InputType::InsertLineBreak,
        "insertParagraph" => InputType::InsertParagraph,
        "insertFromPaste" => InputType::InsertFromPaste,
        "insertReplacementText" => InputType::InsertReplacementText,
        "deleteContentBackward" => InputType::DeleteContentBackward,
        "deleteContentForward" => InputType::DeleteContentForward,
        "deleteWordBackward" | "deleteEntireWordBackward" => InputType::DeleteWordBackward,
        "deleteWordForward" | "deleteEntireWordForward" => InputType::DeleteWordForward,
        "deleteByCut" => InputType::DeleteByCut,
        other => InputType::Unknown(other.to_string()),
    }
}

/// Key combination of a keydown, or None for bare modifier presses and
/// keys that cannot be bound.
pub fn key_combo_from_parts(key: &str, modifiers: Modifiers) -> Option<KeyCombo> {
    let key = Key::from_name(key)?;
    if key.is_modifier() {
        return None;
    }
    Some(KeyCombo::with_modifiers(key, modifiers))
}

pub fn key_combo_from_event(event: &web_sys::KeyboardEvent) -> Option<KeyCombo> {
    let modifiers = Modifiers {
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        shift: event.shift_key(),
        meta: event.meta_key(),
    };
    key_combo_from_parts(&event.key(), modifiers)
}

/// Range the browser intends to modify, from getTargetRanges().
pub fn get_target_range_from_event(
    event: &web_sys::InputEvent,
    content: &web_sys::Node,
    text: &str,
) -> Option<Selection> {
    let ranges = event.get_target_ranges();
    if ranges.length() == 0 {
        return None;
    }
    let range: StaticRange = ranges.get(0).unchecked_into();

    let start = dom_point_to_char(content, &range.startContainer(), range.startOffset(), text)?;
    let end = dom_point_to_char(content, &range.endContainer(), range.endOffset(), text)?;
    Some(Selection::new(start, end))
}

/// Text carried by a beforeinput event, from `data` or the data transfer.
pub fn get_data_from_event(event: &web_sys::InputEvent) -> Option<String> {
    if let Some(data) = event.data() {
        if !data.is_empty() {
            return Some(data);
        }
    }

    if let Some(data_transfer) = event.data_transfer() {
        if let Ok(text) = data_transfer.get_data("text/plain") {
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    None
}

pub fn input_intent_from_event(
    event: &web_sys::InputEvent,
    content: &web_sys::Node,
    text: &str,
) -> InputIntent {
    InputIntent {
        input_type: parse_browser_input_type(&event.input_type()),
        data: get_data_from_event(event),
        target_range: get_target_range_from_event(event, content, text),
        is_composing: event.is_composing(),
    }
}

// === Listeners ===

/// Receiver of editor events.
pub trait EditorEvents {
    /// Current document text, used to map DOM offsets.
    fn document(&self) -> Option<String>;

    /// Current engine selection.
    fn selection(&self) -> Option<Selection>;

    fn keydown(&self, combo: &KeyCombo) -> KeydownResult;

    /// Returns true if the input was consumed.
    fn before_input(&self, intent: &InputIntent) -> bool;

    /// The user moved the DOM selection.
    fn select(&self, selection: Selection);
}

/// Event listeners on one content element. Dropping detaches them.
pub struct EditorListeners {
    _listeners: Vec<EventListener>,
}

impl EditorListeners {
    pub fn attach<S: EditorEvents + 'static>(content: &web_sys::HtmlElement, sink: Rc<S>) -> Self {
        let composition_start: Rc<Cell<Option<Selection>>> = Rc::default();
        // The DOM holds uncommitted IME text while set; repaints would erase it.
        let composing: Rc<Cell<bool>> = Rc::default();
        let mut listeners = Vec::with_capacity(5);

        {
            let sink = sink.clone();
            listeners.push(EventListener::new_with_options(
                content,
                "keydown",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                        return;
                    };
                    if event.is_composing() {
                        return;
                    }
                    let Some(combo) = key_combo_from_event(event) else {
                        return;
                    };
                    if sink.keydown(&combo) == KeydownResult::Handled {
                        event.prevent_default();
                    }
                },
            ));
        }

        {
            let sink = sink.clone();
            let node: web_sys::Node = content.clone().into();
            listeners.push(EventListener::new_with_options(
                content,
                "beforeinput",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let Some(event) = event.dyn_ref::<web_sys::InputEvent>() else {
                        return;
                    };
                    let text = sink.document().unwrap_or_default();
                    let intent = input_intent_from_event(event, &node, &text);
                    let in_composition = intent.is_composing
                        || intent.input_type == InputType::InsertCompositionText;
                    if in_composition {
                        return;
                    }
                    sink.before_input(&intent);
                    event.prevent_default();
                },
            ));
        }

        {
            let sink = sink.clone();
            let start = composition_start.clone();
            let composing = composing.clone();
            listeners.push(EventListener::new(content, "compositionstart", move |_| {
                composing.set(true);
                start.set(sink.selection());
            }));
        }

        {
            let sink = sink.clone();
            let start = composition_start;
            let composing = composing.clone();
            let element = content.clone();
            listeners.push(EventListener::new(
                content,
                "compositionend",
                move |event| {
                    composing.set(false);
                    let data = event
                        .dyn_ref::<web_sys::CompositionEvent>()
                        .and_then(web_sys::CompositionEvent::data)
                        .unwrap_or_default();
                    let mut intent = InputIntent::new(InputType::InsertText).with_data(data);
                    intent.target_range = start.take();
                    sink.before_input(&intent);

                    // Discarded compositions leave the browser's text behind.
                    let text = sink.document().unwrap_or_default();
                    if element.text_content().as_deref() != Some(text.as_str()) {
                        element.set_text_content(Some(&text));
                    }
                },
            ));
        }

        if let Some(document) = content.owner_document() {
            let content = content.clone();
            listeners.push(EventListener::new(&document, "selectionchange", move |_| {
                if composing.get() {
                    return;
                }
                let Some(text) = sink.document() else {
                    return;
                };
                let Some(selection) = read_dom_selection(&content, &text) else {
                    return;
                };
                if sink.selection() != Some(selection) {
                    sink.select(selection);
                }
            }));
        }

        Self {
            _listeners: listeners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_types() {
        assert_eq!(parse_browser_input_type("insertText"), InputType::InsertText);
        assert_eq!(
            parse_browser_input_type("deleteEntireWordBackward"),
            InputType::DeleteWordBackward
        );
        assert_eq!(
            parse_browser_input_type("historyUndo"),
            InputType::Unknown("historyUndo".to_string())
        );
    }

    #[test]
    fn test_key_combo_from_parts() {
        let combo = key_combo_from_parts("Enter", Modifiers::CTRL).unwrap();
        assert_eq!(combo, KeyCombo::parse("Mod-Enter", false).unwrap());

        // Shifted letters still match lowercase bindings.
        let combo = key_combo_from_parts("A", Modifiers::META).unwrap();
        assert_eq!(combo, KeyCombo::parse("Mod-a", true).unwrap());

        assert!(key_combo_from_parts("Shift", Modifiers::NONE).is_none());
        assert!(key_combo_from_parts("F13", Modifiers::NONE).is_none());
    }
}
