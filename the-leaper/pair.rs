use smallvec::SmallVec;

use crate::{
  decoration::Decoration,
  position::{
    Position,
    Range,
  },
};

/// An autoclosed pair being tracked.
///
/// `open` and `close` are the positions of the opening and closing
/// characters. Both always lie on the same line with `open < close`; a pair
/// that would span lines is dropped instead.
#[derive(Debug)]
pub struct Pair {
  pub open:       Position,
  pub close:      Position,
  pub decoration: Option<Decoration>,
}

impl Pair {
  pub fn new(open: Position, close: Position) -> Self {
    debug_assert!(open.line == close.line && open < close);
    Self {
      open,
      close,
      decoration: None,
    }
  }

  /// True while `anchor` lies strictly after the opening side and at or
  /// before the closing side.
  #[inline]
  pub fn encloses(&self, anchor: Position) -> bool {
    self.open < anchor && anchor <= self.close
  }

  /// The single character range of the closing side.
  pub fn close_range(&self) -> Range {
    Range::new(self.close, self.close.translate(0, 1))
  }

  pub fn is_decorated(&self) -> bool {
    self.decoration.is_some()
  }

  pub fn snapshot(&self) -> PairSnapshot {
    PairSnapshot {
      open:         self.open,
      close:        self.close,
      is_decorated: self.is_decorated(),
    }
  }
}

/// Pairs enclosing one cursor, outermost first.
///
/// Each pair strictly encloses the next one, so the last pair is the one
/// nearest to the cursor.
pub type Cluster = SmallVec<[Pair; 4]>;

/// A detached, read-only copy of a tracked pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSnapshot {
  pub open:         Position,
  pub close:        Position,
  pub is_decorated: bool,
}

impl PairSnapshot {
  pub fn new(open: Position, close: Position, is_decorated: bool) -> Self {
    Self {
      open,
      close,
      is_decorated,
    }
  }
}
