//! What a session needs from the editor it is attached to.

use std::fmt;

use crate::{
  position::Range,
  selection::Selection,
  text::TextSource,
};

/// One editor: its document text and its cursors.
///
/// Methods take `&self`; hosts are shared with the session and use interior
/// mutability where they need it.
pub trait EditorHost: TextSource {
  /// Current cursors, in the host's own order.
  fn selections(&self) -> Vec<Selection>;

  /// Replace the cursors.
  ///
  /// The host reports the move back through its usual selection-change
  /// event. It may do so from inside this call: the session holds no borrow
  /// of its own state while calling it.
  fn set_selections(&self, selections: Vec<Selection>);

  /// Scroll so that `range` is visible.
  fn reveal(&self, range: Range);
}

/// Boolean signals consumed by the host's keybinding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextKey {
  /// At least one pair is tracked.
  InLeaperMode,
  /// Every cursor with a pair can see that pair's closing side.
  HasLineOfSight,
}

impl ContextKey {
  pub const ALL: [ContextKey; 2] = [ContextKey::InLeaperMode, ContextKey::HasLineOfSight];

  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::InLeaperMode => "leaper.inLeaperMode",
      Self::HasLineOfSight => "leaper.hasLineOfSight",
    }
  }
}

impl fmt::Display for ContextKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Receives context values. Only called when a value differs from the one
/// last sent.
pub trait ContextSink {
  fn set_context(&self, key: ContextKey, value: bool);
}
