use ropey::RopeSlice;

use crate::chars::utf16_len;

/// Inserted text at or below this many bytes is measured by scanning chars.
/// Longer text is measured by splitting on line-break bytes.
pub const SHORT_TEXT_LEN: usize = 32;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum LineEnding {
  /// CarriageReturn followed by LineFeed.
  Crlf,

  /// U+000A -- LineFeed
  LF,

  /// U+000D -- CarriageReturn
  CR,
}

impl LineEnding {
  #[inline]
  pub const fn len_chars(&self) -> usize {
    match self {
      Self::Crlf => 2,
      _ => 1,
    }
  }

  #[inline]
  pub const fn from_char(ch: char) -> Option<LineEnding> {
    match ch {
      '\u{000A}' => Some(LineEnding::LF),
      '\u{000D}' => Some(LineEnding::CR),
      _ => None,
    }
  }
}

/// Returns the line ending terminating `line`, if any.
pub fn get_line_ending(line: &RopeSlice) -> Option<LineEnding> {
  let len = line.len_chars();
  let last = line.get_char(len.checked_sub(1)?)?;
  match last {
    '\u{000A}' if len >= 2 && line.char(len - 2) == '\u{000D}' => Some(LineEnding::Crlf),
    ch => LineEnding::from_char(ch),
  }
}

/// Shape of a piece of text: how many lines it spans and how long its last
/// line is, in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExtent {
  /// Always at least 1; the empty string is one empty line.
  pub lines:         usize,
  pub last_line_len: usize,
}

impl TextExtent {
  pub fn of(text: &str) -> Self {
    if text.len() <= SHORT_TEXT_LEN {
      Self::scan(text)
    } else {
      Self::split(text)
    }
  }

  #[inline]
  pub const fn is_single_line(&self) -> bool {
    self.lines == 1
  }

  fn scan(text: &str) -> Self {
    let mut lines = 1;
    let mut last_line_len = 0;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
      match ch {
        '\u{000D}' if chars.peek() == Some(&'\u{000A}') => {},
        ch if LineEnding::from_char(ch).is_some() => {
          lines += 1;
          last_line_len = 0;
        },
        ch => last_line_len += ch.len_utf16(),
      }
    }

    Self {
      lines,
      last_line_len,
    }
  }

  fn split(text: &str) -> Self {
    // Line breaks are ASCII, so byte-wise splitting never cuts a char.
    let bytes = text.as_bytes();
    let breaks = bytes
      .iter()
      .enumerate()
      .filter(|&(i, &b)| b == b'\n' || (b == b'\r' && bytes.get(i + 1) != Some(&b'\n')))
      .count();
    let last_line = text.rsplit(['\n', '\r']).next().unwrap_or(text);

    Self {
      lines:         breaks + 1,
      last_line_len: utf16_len(last_line),
    }
  }
}
