//! Common utility functions shared by the parsers.

use crate::parsers::Position;

/// Converts a byte index within `s` into a character index.
///
/// Positions reported to editors count characters, not bytes, so a
/// non-ASCII package name earlier on the line must not shift the column.
/// Indices that fall inside a multi-byte character are clamped to the
/// preceding character boundary.
pub fn char_index(s: &str, byte_idx: usize) -> u32 {
    let mut end = byte_idx.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].chars().count() as u32
}

/// Maps byte offsets in a document to 1-based line/column positions.
///
/// The XML and JSON tokenizers only report byte offsets; this builds the
/// line table once so each lookup is a binary search.
#[derive(Debug)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = Vec::with_capacity(text.len() / 32 + 1);
        line_starts.push(0);
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    /// Position of the character starting at `offset` (1-based line and column)
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let start = self.line_starts[line];
        let column = char_index(&self.text[start..], offset - start);
        Position::new(line as u32 + 1, column + 1)
    }
}
