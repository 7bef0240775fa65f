use crate::line_ending::LineEnding;

#[derive(Debug, Eq, PartialEq)]
pub enum CharCategory {
  Whitespace,
  Eol,
  Other,
}

pub fn categorize_char(ch: char) -> CharCategory {
  match ch {
    c if char_is_line_ending(c) => CharCategory::Eol,
    c if char_is_whitespace(c) => CharCategory::Whitespace,
    _ => CharCategory::Other,
  }
}

#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  LineEnding::from_char(ch).is_some()
}

/// Whitespace as the host editor's `\s` class sees it, line endings excluded.
#[inline]
pub fn char_is_whitespace(ch: char) -> bool {
  match ch {
      '\u{0009}' | // Character Tabulation
      '\u{000B}' | // Line Tabulation
      '\u{000C}' | // Form Feed
      '\u{0020}' | // Space
      '\u{00A0}' | // No-break Space
      '\u{1680}' | // Ogham Space Mark
      '\u{2028}' | // Line Separator
      '\u{2029}' | // Paragraph Separator
      '\u{202F}' | // Narrow No-break Space
      '\u{205F}' | // Medium Mathematical Space
      '\u{3000}' | // Ideographic Space
      '\u{FEFF}'   // Zero Width No-break Space
      => true,

      // En Quad through Hair Space. Zero Width Space is not whitespace here.
      ch if ('\u{2000}' ..= '\u{200A}').contains(&ch) => true,

      _ => false,
    }
}

/// True when `text` is empty or made only of whitespace and line endings.
pub fn str_is_blank(text: &str) -> bool {
  text
    .chars()
    .all(|ch| !matches!(categorize_char(ch), CharCategory::Other))
}

/// Length of `text` in UTF-16 code units.
#[inline]
pub fn utf16_len(text: &str) -> usize {
  text.chars().map(char::len_utf16).sum()
}
