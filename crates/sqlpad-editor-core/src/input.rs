//! Text input intents and the transactions they produce.
//!
//! Platform input (DOM `beforeinput` in the browser) is normalised to an
//! `InputIntent`. `transaction_for_input` turns an intent into a
//! `TransactionSpec` against the current state, applying the behaviour
//! settings (bracket closing, indentation carry-over) along the way.

use smol_str::SmolStr;

use crate::extension::EngineSettings;
use crate::text::TextBuffer;
use crate::transaction::{Change, EditorState, TransactionSpec};
use crate::types::Selection;

/// Kind of text input, mirroring the DOM `InputEvent.inputType` values the
/// editor understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    InsertText,
    InsertLineBreak,
    InsertParagraph,
    InsertFromPaste,
    InsertReplacementText,
    InsertCompositionText,
    DeleteContentBackward,
    DeleteContentForward,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteByCut,
    Unknown(String),
}

impl InputType {
    pub fn is_insert(&self) -> bool {
        matches!(
            self,
            Self::InsertText
                | Self::InsertLineBreak
                | Self::InsertParagraph
                | Self::InsertFromPaste
                | Self::InsertReplacementText
                | Self::InsertCompositionText
        )
    }

    pub fn is_delete(&self) -> bool {
        matches!(
            self,
            Self::DeleteContentBackward
                | Self::DeleteContentForward
                | Self::DeleteWordBackward
                | Self::DeleteWordForward
                | Self::DeleteByCut
        )
    }
}

/// One platform input request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputIntent {
    pub input_type: InputType,
    /// Text to insert, when the input carries any.
    pub data: Option<String>,
    /// Range the platform wants to replace. Falls back to the selection.
    pub target_range: Option<Selection>,
    pub is_composing: bool,
}

impl InputIntent {
    pub fn new(input_type: InputType) -> Self {
        Self {
            input_type,
            data: None,
            target_range: None,
            is_composing: false,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_target_range(mut self, range: Selection) -> Self {
        self.target_range = Some(range);
        self
    }
}

const BRACKET_PAIRS: &[(char, char)] = &[
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('\'', '\''),
    ('"', '"'),
    ('`', '`'),
];

fn closing_for(open: char) -> Option<char> {
    BRACKET_PAIRS
        .iter()
        .find(|(o, _)| *o == open)
        .map(|(_, c)| *c)
}

fn is_closing(c: char) -> bool {
    BRACKET_PAIRS.iter().any(|(_, close)| *close == c)
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the word before `pos`: skip whitespace, then one run of word
/// characters or one run of punctuation.
fn word_start_before<T: TextBuffer>(doc: &T, pos: usize) -> usize {
    let mut i = pos;
    while i > 0 && doc.char_at(i - 1).is_some_and(char::is_whitespace) {
        i -= 1;
    }
    let Some(c) = i.checked_sub(1).and_then(|p| doc.char_at(p)) else {
        return i;
    };
    let word = is_word_char(c);
    while i > 0 {
        match doc.char_at(i - 1) {
            Some(c) if !c.is_whitespace() && is_word_char(c) == word => i -= 1,
            _ => break,
        }
    }
    i
}

fn word_end_after<T: TextBuffer>(doc: &T, pos: usize) -> usize {
    let len = doc.len_chars();
    let mut i = pos;
    while i < len && doc.char_at(i).is_some_and(char::is_whitespace) {
        i += 1;
    }
    let Some(c) = doc.char_at(i) else {
        return i;
    };
    let word = is_word_char(c);
    while i < len {
        match doc.char_at(i) {
            Some(c) if !c.is_whitespace() && is_word_char(c) == word => i += 1,
            _ => break,
        }
    }
    i
}

/// Leading whitespace of the line containing `pos`, up to `pos`.
fn line_indent<T: TextBuffer>(doc: &T, pos: usize) -> String {
    let start = doc.line_to_char(doc.line_of_char(pos));
    (start..pos)
        .map_while(|i| doc.char_at(i).filter(|c| *c == ' ' || *c == '\t'))
        .collect()
}

fn replace(range: std::ops::Range<usize>, text: &str, user_event: &'static str) -> TransactionSpec {
    let caret = range.start + text.chars().count();
    TransactionSpec::new()
        .change(Change::replace(range, text))
        .select(Selection::collapsed(caret))
        .scroll_into_view()
        .user_event(SmolStr::new_static(user_event))
}

fn delete(range: std::ops::Range<usize>, user_event: &'static str) -> Option<TransactionSpec> {
    if range.is_empty() {
        return None;
    }
    Some(replace(range, "", user_event))
}

/// Build the transaction for an input intent, or None when the intent has no
/// effect (or is left to the platform, as composition is).
pub fn transaction_for_input(
    state: &EditorState,
    settings: &EngineSettings,
    intent: &InputIntent,
) -> Option<TransactionSpec> {
    if intent.is_composing {
        return None;
    }

    let doc = state.doc();
    let len = doc.len_chars();
    let range = intent.target_range.unwrap_or_else(|| state.selection());
    let start = range.start().min(len);
    let end = range.end().min(len);
    let text = intent.data.as_deref().unwrap_or("");

    match &intent.input_type {
        InputType::InsertText => {
            if text.is_empty() {
                return delete(start..end, "delete.selection");
            }
            if settings.close_brackets && start == end {
                if let Some(c) = single_char(text) {
                    // Typing a closing character over the same character steps past it.
                    if is_closing(c) && doc.char_at(start) == Some(c) {
                        return Some(
                            TransactionSpec::new()
                                .select(Selection::collapsed(start + 1))
                                .user_event("input.type"),
                        );
                    }
                    if let Some(close) = closing_for(c) {
                        let pair: String = [c, close].into_iter().collect();
                        return Some(
                            TransactionSpec::new()
                                .change(Change::insert(start, pair))
                                .select(Selection::collapsed(start + 1))
                                .scroll_into_view()
                                .user_event("input.type"),
                        );
                    }
                }
            }
            Some(replace(start..end, text, "input.type"))
        }
        InputType::InsertFromPaste => {
            if text.is_empty() {
                return None;
            }
            Some(replace(start..end, text, "input.paste"))
        }
        InputType::InsertReplacementText => Some(replace(start..end, text, "input.replace")),
        InputType::InsertLineBreak | InputType::InsertParagraph => {
            let indent = line_indent(doc, start);
            Some(replace(start..end, &format!("\n{indent}"), "input.newline"))
        }
        InputType::DeleteContentBackward => {
            if start != end {
                return delete(start..end, "delete.backward");
            }
            if start == 0 {
                return None;
            }
            let prev = doc.char_at(start - 1);
            let paired = settings.close_brackets
                && prev.and_then(closing_for).is_some()
                && prev.and_then(closing_for) == doc.char_at(start);
            if paired {
                delete(start - 1..start + 1, "delete.backward")
            } else {
                delete(start - 1..start, "delete.backward")
            }
        }
        InputType::DeleteContentForward => {
            if start != end {
                return delete(start..end, "delete.forward");
            }
            delete(start..(start + 1).min(len), "delete.forward")
        }
        InputType::DeleteWordBackward => {
            if start != end {
                return delete(start..end, "delete.word");
            }
            delete(word_start_before(doc, start)..start, "delete.word")
        }
        InputType::DeleteWordForward => {
            if start != end {
                return delete(start..end, "delete.word");
            }
            delete(start..word_end_after(doc, start), "delete.word")
        }
        InputType::DeleteByCut => delete(start..end, "delete.cut"),
        InputType::InsertCompositionText | InputType::Unknown(_) => None,
    }
}
