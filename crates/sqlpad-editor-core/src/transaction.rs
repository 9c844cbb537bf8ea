//! Editor state and transactions.
//!
//! A `Transaction` is built from an `EditorState` and a `TransactionSpec`. It
//! carries the complete state the engine will hold once it is applied, so the
//! text reported to change listeners is exactly the text that was committed.
//!
//! Change ranges are expressed in offsets of the state the transaction starts
//! from, must be sorted, and must not overlap.

use smol_str::SmolStr;
use thiserror::Error;

use crate::text::{EditorRope, TextBuffer};
use crate::types::Selection;

/// A single replacement of `from..to` (pre-transaction char offsets) by `insert`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub from: usize,
    pub to: usize,
    pub insert: SmolStr,
}

impl Change {
    pub fn insert(at: usize, text: impl Into<SmolStr>) -> Self {
        Self {
            from: at,
            to: at,
            insert: text.into(),
        }
    }

    pub fn delete(range: std::ops::Range<usize>) -> Self {
        Self {
            from: range.start,
            to: range.end,
            insert: SmolStr::default(),
        }
    }

    pub fn replace(range: std::ops::Range<usize>, text: impl Into<SmolStr>) -> Self {
        Self {
            from: range.start,
            to: range.end,
            insert: text.into(),
        }
    }

    /// A change that neither deletes nor inserts anything.
    pub fn is_empty(&self) -> bool {
        self.from == self.to && self.insert.is_empty()
    }

    fn inserted_len(&self) -> usize {
        self.insert.chars().count()
    }
}

/// Description of a mutation, before it has been validated against a state.
#[derive(Clone, Debug, Default)]
pub struct TransactionSpec {
    pub changes: Vec<Change>,
    /// Explicit selection in post-transaction offsets. When absent, the current
    /// selection is mapped through the changes.
    pub selection: Option<Selection>,
    pub scroll_into_view: bool,
    /// Free-form annotation of what produced the transaction ("input.type",
    /// "delete.backward", "select", ...).
    pub user_event: Option<SmolStr>,
}

impl TransactionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn change(mut self, change: Change) -> Self {
        self.changes.push(change);
        self
    }

    pub fn select(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn scroll_into_view(mut self) -> Self {
        self.scroll_into_view = true;
        self
    }

    pub fn user_event(mut self, event: impl Into<SmolStr>) -> Self {
        self.user_event = Some(event.into());
        self
    }
}

/// Reasons a `TransactionSpec` cannot be turned into a `Transaction`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("change {from}..{to} is inverted")]
    Inverted { from: usize, to: usize },
    #[error("change {from}..{to} is out of bounds for a document of {len} chars")]
    OutOfBounds { from: usize, to: usize, len: usize },
    #[error("change at {at} overlaps the previous change ending at {prev_end}")]
    Overlapping { at: usize, prev_end: usize },
    #[error("selection {anchor}..{head} is out of bounds for a document of {len} chars")]
    SelectionOutOfBounds { anchor: usize, head: usize, len: usize },
}

/// Immutable snapshot of the engine's document and selection.
#[derive(Clone, Debug)]
pub struct EditorState {
    doc: EditorRope,
    selection: Selection,
    version: u64,
}

impl EditorState {
    /// Create the initial state for a document, cursor at the start.
    pub fn new(doc: &str) -> Self {
        Self {
            doc: EditorRope::from_str(doc),
            selection: Selection::collapsed(0),
            version: 0,
        }
    }

    pub fn doc(&self) -> &EditorRope {
        &self.doc
    }

    /// Full document text.
    pub fn doc_string(&self) -> String {
        self.doc.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.doc.len_chars()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Number of transactions applied to reach this state.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Validate a spec against this state and build the transaction.
    pub fn update(&self, spec: TransactionSpec) -> Result<Transaction, TransactionError> {
        let len = self.doc.len_chars();
        let mut prev_end = 0;
        for change in &spec.changes {
            if change.from > change.to {
                return Err(TransactionError::Inverted {
                    from: change.from,
                    to: change.to,
                });
            }
            if change.to > len {
                return Err(TransactionError::OutOfBounds {
                    from: change.from,
                    to: change.to,
                    len,
                });
            }
            if change.from < prev_end {
                return Err(TransactionError::Overlapping {
                    at: change.from,
                    prev_end,
                });
            }
            prev_end = change.to;
        }

        let changes: Vec<Change> = spec
            .changes
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect();

        // Apply back to front so earlier offsets stay valid.
        let mut doc = self.doc.clone();
        for change in changes.iter().rev() {
            if change.to > change.from {
                doc.delete(change.from..change.to);
            }
            if !change.insert.is_empty() {
                doc.insert(change.from, &change.insert);
            }
        }

        let selection = match spec.selection {
            Some(selection) => {
                let new_len = doc.len_chars();
                if selection.end() > new_len {
                    return Err(TransactionError::SelectionOutOfBounds {
                        anchor: selection.anchor,
                        head: selection.head,
                        len: new_len,
                    });
                }
                selection
            }
            None => Selection::new(
                map_position(self.selection.anchor, &changes),
                map_position(self.selection.head, &changes),
            ),
        };

        Ok(Transaction {
            start_version: self.version,
            doc_changed: !changes.is_empty(),
            changes,
            scroll_into_view: spec.scroll_into_view,
            user_event: spec.user_event,
            state: EditorState {
                doc,
                selection,
                version: self.version + 1,
            },
        })
    }
}

/// Map a pre-transaction offset to its post-transaction position.
///
/// Insertions at the position push it forward; a position inside a replaced
/// range lands after the inserted text.
pub fn map_position(pos: usize, changes: &[Change]) -> usize {
    let mut shifted = pos;
    for change in changes {
        if change.from > pos {
            break;
        }
        let inserted = change.inserted_len();
        if change.to <= pos {
            shifted = shifted + inserted - (change.to - change.from);
        } else {
            let start = shifted - (pos - change.from);
            return start + inserted;
        }
    }
    shifted
}

/// An atomic document/selection mutation, validated against one state version.
#[derive(Clone, Debug)]
pub struct Transaction {
    start_version: u64,
    changes: Vec<Change>,
    doc_changed: bool,
    scroll_into_view: bool,
    user_event: Option<SmolStr>,
    state: EditorState,
}

impl Transaction {
    /// Whether applying this transaction alters the document text.
    pub fn doc_changed(&self) -> bool {
        self.doc_changed
    }

    /// Version of the state this transaction was built from.
    pub fn start_version(&self) -> u64 {
        self.start_version
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// The state the engine holds after this transaction is applied.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn new_doc(&self) -> &EditorRope {
        self.state.doc()
    }

    pub fn selection(&self) -> Selection {
        self.state.selection()
    }

    pub fn scroll_into_view(&self) -> bool {
        self.scroll_into_view
    }

    pub fn user_event(&self) -> Option<&str> {
        self.user_event.as_deref()
    }

    pub(crate) fn into_state(self) -> EditorState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_changes_doc() {
        let state = EditorState::new("SELECT 1");
        let tr = state
            .update(TransactionSpec::new().change(Change::insert(8, ";")))
            .unwrap();

        assert!(tr.doc_changed());
        assert_eq!(tr.new_doc().to_string(), "SELECT 1;");
        assert_eq!(tr.start_version(), 0);
        assert_eq!(tr.state().version(), 1);
        // Original state untouched.
        assert_eq!(state.doc_string(), "SELECT 1");
    }

    #[test]
    fn test_selection_only_is_not_doc_change() {
        let state = EditorState::new("SELECT 1");
        let tr = state
            .update(TransactionSpec::new().select(Selection::new(0, 6)))
            .unwrap();

        assert!(!tr.doc_changed());
        assert_eq!(tr.selection(), Selection::new(0, 6));
        assert_eq!(tr.new_doc().to_string(), "SELECT 1");
    }

    #[test]
    fn test_empty_changes_are_dropped() {
        let state = EditorState::new("SELECT 1");
        let tr = state
            .update(TransactionSpec::new().change(Change::insert(3, "")))
            .unwrap();
        assert!(!tr.doc_changed());
        assert!(tr.changes().is_empty());
    }

    #[test]
    fn test_multiple_changes_use_original_offsets() {
        let state = EditorState::new("select a from t");
        let tr = state
            .update(
                TransactionSpec::new()
                    .change(Change::replace(0..6, "SELECT"))
                    .change(Change::replace(9..13, "FROM")),
            )
            .unwrap();
        assert_eq!(tr.new_doc().to_string(), "SELECT a FROM t");
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        let state = EditorState::new("abc");
        let err = state
            .update(TransactionSpec::new().change(Change::delete(2..10)))
            .unwrap_err();
        assert_eq!(
            err,
            TransactionError::OutOfBounds {
                from: 2,
                to: 10,
                len: 3
            }
        );
    }

    #[test]
    fn test_rejects_overlapping() {
        let state = EditorState::new("abcdef");
        let err = state
            .update(
                TransactionSpec::new()
                    .change(Change::delete(0..3))
                    .change(Change::delete(2..4)),
            )
            .unwrap_err();
        assert_eq!(err, TransactionError::Overlapping { at: 2, prev_end: 3 });
    }

    #[test]
    fn test_rejects_inverted() {
        let state = EditorState::new("abcdef");
        let err = state
            .update(TransactionSpec::new().change(Change {
                from: 4,
                to: 1,
                insert: SmolStr::default(),
            }))
            .unwrap_err();
        assert_eq!(err, TransactionError::Inverted { from: 4, to: 1 });
    }

    #[test]
    fn test_rejects_selection_past_end() {
        let state = EditorState::new("abc");
        let err = state
            .update(TransactionSpec::new().select(Selection::collapsed(4)))
            .unwrap_err();
        assert!(matches!(err, TransactionError::SelectionOutOfBounds { .. }));
    }

    #[test]
    fn test_map_position() {
        let changes = vec![Change::insert(2, "xx"), Change::replace(5..8, "y")];
        assert_eq!(map_position(0, &changes), 0);
        // Insertion at the position pushes it forward.
        assert_eq!(map_position(2, &changes), 4);
        assert_eq!(map_position(4, &changes), 6);
        // Inside the replaced range: after the inserted text.
        assert_eq!(map_position(6, &changes), 8);
        assert_eq!(map_position(8, &changes), 8);
        assert_eq!(map_position(10, &changes), 10);
    }

    #[test]
    fn test_selection_mapped_when_not_given() {
        let state = EditorState::new("SELECT 1");
        let state = state
            .update(TransactionSpec::new().select(Selection::collapsed(8)))
            .unwrap()
            .into_state();
        let tr = state
            .update(TransactionSpec::new().change(Change::insert(0, "-- q\n")))
            .unwrap();
        assert_eq!(tr.selection(), Selection::collapsed(13));
    }
}
