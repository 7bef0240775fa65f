use std::borrow::Cow;

use ropey::Rope;
use the_core::utf16::char_idx_at_utf16;

use crate::position::Range;

/// Read access to the document text, addressed in UTF-16 positions.
pub trait TextSource {
  /// The text covered by `range`, or `None` if the range is not inside the
  /// document.
  fn text_in(&self, range: Range) -> Option<Cow<'_, str>>;
}

impl TextSource for Rope {
  fn text_in(&self, range: Range) -> Option<Cow<'_, str>> {
    let text = self.slice(..);
    let start = char_idx_at_utf16(text, range.start.line, range.start.character)?;
    let end = char_idx_at_utf16(text, range.end.line, range.end.character)?;
    Some(text.slice(start..end).into())
  }
}

#[cfg(test)]
impl TextSource for str {
  fn text_in(&self, range: Range) -> Option<Cow<'_, str>> {
    Rope::from_str(self)
      .text_in(range)
      .map(|text| Cow::Owned(text.into_owned()))
  }
}
