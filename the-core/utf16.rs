//! Conversions between UTF-16 `(line, character)` coordinates, which is how
//! editor hosts report positions, and rope char indices.

use ropey::RopeSlice;

use crate::line_ending::get_line_ending;

/// Convert a UTF-16 `(line, character)` pair to a char index.
///
/// Returns `None` when the line does not exist or the character offset lies
/// past the end of the line's content (the line ending excluded). An offset
/// pointing into the middle of a surrogate pair resolves to that char.
pub fn char_idx_at_utf16(text: RopeSlice, line: usize, character: usize) -> Option<usize> {
  if line >= text.len_lines() {
    return None;
  }

  let line_start = text.line_to_char(line);
  let line_slice = text.line(line);
  let content_chars =
    line_slice.len_chars() - get_line_ending(&line_slice).map_or(0, |ending| ending.len_chars());
  if character > line_slice.char_to_utf16_cu(content_chars) {
    return None;
  }

  Some(line_start + line_slice.utf16_cu_to_char(character))
}

/// Convert a char index to a UTF-16 `(line, character)` pair.
///
/// The index is clamped to the end of the text.
pub fn utf16_at_char_idx(text: RopeSlice, char_idx: usize) -> (usize, usize) {
  let char_idx = char_idx.min(text.len_chars());
  let line = text.char_to_line(char_idx);
  let line_start = text.line_to_char(line);
  let character = text.char_to_utf16_cu(char_idx) - text.char_to_utf16_cu(line_start);
  (line, character)
}
