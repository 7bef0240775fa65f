//! Visual markers on the closing side of tracked pairs.
//!
//! The tracker never draws anything itself. It asks a [`DecorationRenderer`]
//! for a handle covering the closing character of a pair, and gives the
//! handle back when the marker should go away. Hosts move applied decorations
//! along with edits on their own; the tracker never re-applies one because
//! its pair moved.
//!
//! Handles are held through [`Decoration`], which disposes its handle when
//! dropped. Dropping the owning pair, or the pending-removal list the pair
//! was moved into, is therefore the only way a marker gets removed.

use std::{
  fmt,
  rc::Rc,
};

use serde::{
  Deserialize,
  Serialize,
};

use crate::position::Range;

/// How decorations look. Opaque to the tracker; passed through to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DecorationStyle {
  pub outline_color:    Option<String>,
  pub outline_width:    Option<String>,
  pub outline_style:    Option<String>,
  pub font_weight:      Option<String>,
  pub color:            Option<String>,
  pub background_color: Option<String>,
}

impl Default for DecorationStyle {
  fn default() -> Self {
    Self {
      outline_color:    Some("editorBracketMatch.border".into()),
      outline_width:    Some("1px".into()),
      outline_style:    Some("solid".into()),
      font_weight:      Some("bolder".into()),
      color:            None,
      background_color: None,
    }
  }
}

/// Identifier the renderer issued for one applied decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationId(pub u64);

/// The host side of decorations.
///
/// Requests are not expected to take effect synchronously; the tracker only
/// issues them once per turn, for the final state of that turn.
pub trait DecorationRenderer {
  fn apply(&self, style: &DecorationStyle, range: Range) -> DecorationId;
  fn dispose(&self, id: DecorationId);
}

/// An applied decoration, disposed when dropped.
pub struct Decoration {
  id:       DecorationId,
  renderer: Rc<dyn DecorationRenderer>,
}

impl Decoration {
  pub fn apply(renderer: &Rc<dyn DecorationRenderer>, style: &DecorationStyle, range: Range) -> Self {
    let id = renderer.apply(style, range);
    Self {
      id,
      renderer: Rc::clone(renderer),
    }
  }

  pub fn id(&self) -> DecorationId {
    self.id
  }
}

impl Drop for Decoration {
  fn drop(&mut self) {
    self.renderer.dispose(self.id);
  }
}

impl fmt::Debug for Decoration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Decoration").field(&self.id.0).finish()
  }
}
