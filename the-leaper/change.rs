//! Events reported by the host editor.

use crate::{
  position::Range,
  selection::Selection,
};

/// One replacement: `range` in pre-edit coordinates is replaced by `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
  pub range: Range,
  pub text:  String,
}

impl ContentChange {
  pub fn new(range: Range, text: impl Into<String>) -> Self {
    Self {
      range,
      text: text.into(),
    }
  }

  pub fn is_insertion(&self) -> bool {
    self.range.is_empty()
  }
}

/// A batch of replacements applied together.
///
/// Hosts report batches ordered by descending range start, i.e. the edit
/// closest to the end of the document first. The tracker relies on that
/// order and does not check it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentChangeEvent {
  pub changes: Vec<ContentChange>,
}

impl ContentChangeEvent {
  pub fn new(changes: Vec<ContentChange>) -> Self {
    Self { changes }
  }
}

/// The full set of cursors after a selection change, in host order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChangeEvent {
  pub selections: Vec<Selection>,
}

impl SelectionChangeEvent {
  pub fn new(selections: Vec<Selection>) -> Self {
    Self { selections }
  }
}
