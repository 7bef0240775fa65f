/// A single point in a text buffer.
///
/// 0-indexed. `character` counts UTF-16 code units from the start of the
/// line, which is how editor hosts address text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
  pub line:      usize,
  pub character: usize,
}

impl Position {
  pub const fn new(line: usize, character: usize) -> Self {
    Self { line, character }
  }

  pub const fn zero() -> Self {
    Self {
      line:      0,
      character: 0,
    }
  }

  #[inline]
  pub fn is_before(&self, other: &Position) -> bool {
    self < other
  }

  #[inline]
  pub fn is_before_or_equal(&self, other: &Position) -> bool {
    self <= other
  }

  #[inline]
  pub fn is_after(&self, other: &Position) -> bool {
    self > other
  }

  #[inline]
  pub fn is_after_or_equal(&self, other: &Position) -> bool {
    self >= other
  }

  /// Move by a signed number of lines and characters.
  ///
  /// Deltas come from edits that precede this position, so they never move
  /// it before the start of the document; underflow saturates at zero.
  pub fn translate(self, line_delta: isize, character_delta: isize) -> Self {
    debug_assert!(self.line.checked_add_signed(line_delta).is_some());
    debug_assert!(self.character.checked_add_signed(character_delta).is_some());
    Self {
      line:      self.line.saturating_add_signed(line_delta),
      character: self.character.saturating_add_signed(character_delta),
    }
  }
}

impl From<(usize, usize)> for Position {
  fn from(value: (usize, usize)) -> Self {
    Position::new(value.0, value.1)
  }
}

/// A half-open span `[start, end)` between two positions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
  pub start: Position,
  pub end:   Position,
}

impl Range {
  /// Build a range; the bounds are swapped if given in reverse.
  pub fn new(a: Position, b: Position) -> Self {
    if a <= b {
      Self { start: a, end: b }
    } else {
      Self { start: b, end: a }
    }
  }

  pub const fn point(pos: Position) -> Self {
    Self {
      start: pos,
      end:   pos,
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  #[inline]
  pub fn is_single_line(&self) -> bool {
    self.start.line == self.end.line
  }

  pub fn contains(&self, pos: Position) -> bool {
    self.start <= pos && pos < self.end
  }
}

impl From<(Position, Position)> for Range {
  fn from((a, b): (Position, Position)) -> Self {
    Range::new(a, b)
  }
}
