//! Char-offset helpers
//!
//! Selection offsets count Unicode scalar values, while Rust strings index
//! by byte. Everything that slices node text goes through these.

/// Number of chars in `s`
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the char at `offset`, clamped to the end of the string
pub fn byte_index(s: &str, offset: usize) -> usize {
    s.char_indices()
        .nth(offset)
        .map_or(s.len(), |(index, _)| index)
}

/// Split at a char offset
pub fn split_at_char(s: &str, offset: usize) -> (&str, &str) {
    s.split_at(byte_index(s, offset))
}

/// Char offset of the first char matching `ch`
pub fn find_char(s: &str, ch: char) -> Option<usize> {
    s.chars().position(|c| c == ch)
}

/// Char offset of the last char matching `ch`
pub fn rfind_char(s: &str, ch: char) -> Option<usize> {
    let mut found = None;
    for (offset, c) in s.chars().enumerate() {
        if c == ch {
            found = Some(offset);
        }
    }
    found
}

/// Copy of `s` with `ch` inserted at a char offset
pub fn insert_char_at(s: &str, offset: usize, ch: char) -> String {
    let (head, tail) = split_at_char(s, offset);
    let mut out = String::with_capacity(s.len() + ch.len_utf8());
    out.push_str(head);
    out.push(ch);
    out.push_str(tail);
    out
}

/// Copy of `s` without the char at `offset`
pub fn remove_char_at(s: &str, offset: usize) -> String {
    s.chars()
        .enumerate()
        .filter(|(i, _)| *i != offset)
        .map(|(_, c)| c)
        .collect()
}
