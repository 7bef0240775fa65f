//! Host cursors.
//!
//! A [`Selection`] has two positions: `anchor` and `active`. The `active`
//! side is where the caret is drawn; the `anchor` is the other end. When
//! both are equal the selection is empty and behaves as a plain cursor.
//!
//! ```text
//! anchor=2, active=7: "he[llo w]orld"  (forward selection)
//! anchor=7, active=2: "he]llo w[orld"  (backward selection)
//! anchor=5, active=5: "hello|world"    (cursor)
//! ```
//!
//! The tracker associates pairs with cursors through the `anchor` side.

use crate::position::{
  Position,
  Range,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
  pub anchor: Position,
  pub active: Position,
}

impl Selection {
  pub const fn new(anchor: Position, active: Position) -> Self {
    Self { anchor, active }
  }

  /// An empty selection, i.e. a cursor, at `pos`.
  pub const fn point(pos: Position) -> Self {
    Self {
      anchor: pos,
      active: pos,
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.active
  }

  pub fn range(&self) -> Range {
    Range::new(self.anchor, self.active)
  }
}

/// A host cursor together with its index in the host's own (unsorted) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortedCursor {
  pub unsorted_index: usize,
  pub selection:      Selection,
}

impl SortedCursor {
  #[inline]
  pub fn anchor(&self) -> Position {
    self.selection.anchor
  }
}

/// Sort cursors by ascending anchor, remembering where each came from.
///
/// Host cursor order is not assumed to be stable across events, so the
/// tracker only ever relies on this sorted view.
pub fn sort_cursors(selections: &[Selection]) -> Vec<SortedCursor> {
  let mut sorted: Vec<SortedCursor> = selections
    .iter()
    .enumerate()
    .map(|(unsorted_index, &selection)| {
      SortedCursor {
        unsorted_index,
        selection,
      }
    })
    .collect();
  sorted.sort_by_key(|cursor| cursor.anchor());
  sorted
}
