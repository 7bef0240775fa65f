//! Turning a batch of content changes into position deltas.
//!
//! Hosts report a batch of changes from the bottom of the document to the
//! top, but the tracker walks its positions from the top down. A
//! [`DeltaStack`] bridges the two: the change nearest the start of the
//! document sits on top, and popping a change folds its effect into two
//! carries that apply to every position after it.
//!
//! - The **vertical carry** is the net number of lines added by all popped
//!   changes.
//! - The **horizontal carry** is the net number of characters added on one
//!   specific line: the last line replaced by the most recently popped
//!   change. Positions on any other line are unaffected by it.
//!
//! ```text
//! before:  ab|cd ef        change: replace [0:2, 1:1) with "X"
//!          g|hi            position 1:2 ("i") -> 0:4
//! after:   abXhi
//! ```
//!
//! Positions must be shifted in ascending order; the stack never goes back.

use the_core::line_ending::TextExtent;

use crate::{
  change::ContentChange,
  position::Position,
};

/// Net character displacement applying only to positions on `affects_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorzCarry {
  /// Line in pre-edit coordinates.
  pub affects_line: usize,
  pub value:        isize,
}

#[derive(Debug, Clone)]
pub struct DeltaStack<'a> {
  changes:    &'a [ContentChange],
  /// One past the logical top of the stack.
  end:        usize,
  vert_carry: isize,
  horz_carry: Option<HorzCarry>,
}

impl<'a> DeltaStack<'a> {
  /// `changes` must be ordered by descending range start.
  pub fn new(changes: &'a [ContentChange]) -> Self {
    Self {
      changes,
      end: changes.len(),
      vert_carry: 0,
      horz_carry: None,
    }
  }

  pub fn len(&self) -> usize {
    self.end
  }

  pub fn is_empty(&self) -> bool {
    self.end == 0
  }

  pub fn vert_carry(&self) -> isize {
    self.vert_carry
  }

  pub fn horz_carry(&self) -> Option<HorzCarry> {
    self.horz_carry
  }

  /// The change nearest to the start of the document not yet popped.
  pub fn peek(&self) -> Option<&'a ContentChange> {
    self.end.checked_sub(1).map(|top| &self.changes[top])
  }

  /// Pop the top change and fold its displacement into the carries.
  pub fn pop(&mut self) -> Option<&'a ContentChange> {
    let change = self.peek()?;
    let range = change.range;

    let replaced_lines = range.end.line - range.start.line + 1;
    let replaced_last_line_len = if range.is_single_line() {
      range.end.character - range.start.character
    } else {
      range.end.character
    };
    let inserted = TextExtent::of(&change.text);

    self.vert_carry += inserted.lines as isize - replaced_lines as isize;

    let start_character = range.start.character as isize;
    let mut value = inserted.last_line_len as isize - replaced_last_line_len as isize;
    match (range.is_single_line(), inserted.is_single_line()) {
      (true, false) => value -= start_character,
      (false, true) => value += start_character,
      _ => {},
    }

    // A single-line insertion continues the line the previous change left
    // off on, so the displacements on that line add up.
    if inserted.is_single_line() {
      if let Some(prev) = self
        .horz_carry
        .filter(|prev| prev.affects_line == range.start.line)
      {
        value += prev.value;
      }
    }

    self.horz_carry = Some(HorzCarry {
      affects_line: range.end.line,
      value,
    });
    self.end -= 1;
    Some(change)
  }

  /// Apply the current carries to `pos` without popping anything.
  pub fn translate(&self, pos: Position) -> Position {
    let horz = match self.horz_carry {
      Some(carry) if carry.affects_line == pos.line => carry.value,
      _ => 0,
    };
    pos.translate(self.vert_carry, horz)
  }

  /// Shift a pre-edit position to its post-edit location.
  ///
  /// Pops every change ending at or before `pos`. Returns `None` when `pos`
  /// lies inside a replaced range, i.e. the text there no longer exists.
  pub fn shift(&mut self, pos: Position) -> Option<Position> {
    while self.peek().is_some_and(|change| change.range.end <= pos) {
      self.pop();
    }

    if self.peek().is_some_and(|change| change.range.start <= pos) {
      return None;
    }

    Some(self.translate(pos))
  }

  /// Pop every change that lies entirely before `pos`, leaving an insertion
  /// made exactly at `pos` on top.
  ///
  /// Changes that reach past `pos` stay put so that later positions they
  /// overwrite are still reported as gone.
  pub fn advance_to(&mut self, pos: Position) {
    while self.peek().is_some_and(|change| {
      change.range.end < pos || (change.range.end == pos && !change.range.is_empty())
    }) {
      self.pop();
    }
  }
}
