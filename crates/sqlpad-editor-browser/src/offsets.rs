//! Conversion between char offsets and DOM (UTF-16) offsets.
//!
//! The engine counts Unicode scalar values; DOM text nodes and selections
//! count UTF-16 code units. Offsets past the end clamp to the end, and a
//! UTF-16 offset inside a surrogate pair rounds down to the pair's start.

/// UTF-16 offset of the char at `char_offset`.
pub fn char_to_utf16(text: &str, char_offset: usize) -> usize {
    text.chars().take(char_offset).map(char::len_utf16).sum()
}

/// Char offset containing the UTF-16 code unit at `utf16_offset`.
pub fn utf16_to_char(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (index, c) in text.chars().enumerate() {
        let next = units + c.len_utf16();
        if next > utf16_offset {
            return index;
        }
        units = next;
    }
    text.chars().count()
}
