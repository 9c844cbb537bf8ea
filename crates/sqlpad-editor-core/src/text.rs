//! Document storage.
//!
//! Editor state and commands read the document through `TextBuffer`, so the
//! rope is an implementation detail of `EditorRope`.

use smol_str::{SmolStr, ToSmolStr};
use std::ops::Range;

/// Char-addressed document text.
pub trait TextBuffer {
    fn len_chars(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    fn insert(&mut self, at: usize, text: &str);

    fn delete(&mut self, range: Range<usize>);

    /// `None` when `range` is reversed or past the end.
    fn slice(&self, range: Range<usize>) -> Option<SmolStr>;

    fn char_at(&self, at: usize) -> Option<char>;

    fn to_string(&self) -> String;

    /// An empty buffer has one line.
    fn len_lines(&self) -> usize;

    /// Line containing `at`. Offsets past the end clamp to the last line.
    fn line_of_char(&self, at: usize) -> usize;

    /// Offset of the first char of `line`.
    fn line_to_char(&self, line: usize) -> usize;
}

/// Ropey-backed document. Clones share nodes, so a transaction can carry the
/// whole post-change document cheaply.
#[derive(Clone, Default)]
pub struct EditorRope(ropey::Rope);

impl EditorRope {
    pub fn from_str(text: &str) -> Self {
        Self(ropey::Rope::from_str(text))
    }
}

impl std::fmt::Debug for EditorRope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EditorRope({:?})", self.0.to_string())
    }
}

impl TextBuffer for EditorRope {
    fn len_chars(&self) -> usize {
        self.0.len_chars()
    }

    fn insert(&mut self, at: usize, text: &str) {
        self.0.insert(at, text);
    }

    fn delete(&mut self, range: Range<usize>) {
        self.0.remove(range);
    }

    fn slice(&self, range: Range<usize>) -> Option<SmolStr> {
        (range.start <= range.end && range.end <= self.0.len_chars())
            .then(|| self.0.slice(range).to_smolstr())
    }

    fn char_at(&self, at: usize) -> Option<char> {
        (at < self.0.len_chars()).then(|| self.0.char(at))
    }

    fn to_string(&self) -> String {
        self.0.to_string()
    }

    fn len_lines(&self) -> usize {
        self.0.len_lines()
    }

    fn line_of_char(&self, at: usize) -> usize {
        self.0.char_to_line(at.min(self.0.len_chars()))
    }

    fn line_to_char(&self, line: usize) -> usize {
        self.0.line_to_char(line.min(self.0.len_lines()))
    }
}
