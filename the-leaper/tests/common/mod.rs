//! A scripted editor for driving a [`Controller`] end to end.
//!
//! Edits are applied at every cursor at once, the way a multi-cursor editor
//! does, and reported as the host would: content change first (bottom to
//! top), then the new selections.

use std::{
  borrow::Cow,
  cell::{
    Cell,
    RefCell,
  },
  collections::{
    BTreeMap,
    VecDeque,
  },
  rc::Rc,
};

use ropey::Rope;
use the_core::utf16::{
  char_idx_at_utf16,
  utf16_at_char_idx,
};
use the_event::TurnQueue;
use the_leaper::{
  change::{
    ContentChange,
    ContentChangeEvent,
    SelectionChangeEvent,
  },
  command::Command,
  config::Configuration,
  controller::Controller,
  decoration::{
    DecorationId,
    DecorationRenderer,
    DecorationStyle,
  },
  delta::DeltaStack,
  host::{
    ContextKey,
    ContextSink,
    EditorHost,
  },
  position::{
    Position,
    Range,
  },
  selection::Selection,
  session::Services,
  text::TextSource,
};

pub fn p(line: usize, character: usize) -> Position {
  Position::new(line, character)
}

pub fn cursor(line: usize, character: usize) -> Selection {
  Selection::point(p(line, character))
}

pub struct FakeEditor {
  text:         RefCell<Rope>,
  selections:   RefCell<Vec<Selection>>,
  pub revealed: RefCell<Vec<Range>>,
  /// Selection changes made through `set_selections`, not yet reported.
  moved:        RefCell<VecDeque<Vec<Selection>>>,
  /// Decorations moved along with edits, as a real host does.
  renderer:     Option<Rc<RecordingRenderer>>,
}

impl FakeEditor {
  pub fn new(text: &str, selections: Vec<Selection>) -> Rc<Self> {
    Self::build(text, selections, None)
  }

  pub fn with_renderer(
    text: &str,
    selections: Vec<Selection>,
    renderer: Rc<RecordingRenderer>,
  ) -> Rc<Self> {
    Self::build(text, selections, Some(renderer))
  }

  fn build(
    text: &str,
    selections: Vec<Selection>,
    renderer: Option<Rc<RecordingRenderer>>,
  ) -> Rc<Self> {
    Rc::new(Self {
      text:       RefCell::new(Rope::from_str(text)),
      selections: RefCell::new(selections),
      revealed:   RefCell::default(),
      moved:      RefCell::default(),
      renderer,
    })
  }

  pub fn text(&self) -> String {
    self.text.borrow().to_string()
  }

  pub fn char_at(&self, pos: Position) -> Option<char> {
    let rope = self.text.borrow();
    let idx = char_idx_at_utf16(rope.slice(..), pos.line, pos.character)?;
    rope.get_char(idx)
  }

  fn char_idx(rope: &Rope, pos: Position) -> usize {
    char_idx_at_utf16(rope.slice(..), pos.line, pos.character).unwrap_or(rope.len_chars())
  }

  fn position(rope: &Rope, idx: usize) -> Position {
    utf16_at_char_idx(rope.slice(..), idx).into()
  }

  /// Replace `delete_before` characters in front of every cursor with
  /// `text`, leaving each cursor `cursor_offset` characters into it.
  pub fn edit(
    &self,
    delete_before: usize,
    text: &str,
    cursor_offset: usize,
  ) -> (ContentChangeEvent, SelectionChangeEvent) {
    let mut rope = self.text.borrow_mut();

    let mut cursors: Vec<usize> = self
      .selections
      .borrow()
      .iter()
      .map(|selection| Self::char_idx(&rope, selection.active))
      .collect();
    cursors.sort_unstable();
    cursors.dedup();

    let edits: Vec<(usize, usize)> = cursors
      .iter()
      .map(|&at| (at.saturating_sub(delete_before), at))
      .collect();

    let changes: Vec<ContentChange> = edits
      .iter()
      .rev()
      .map(|&(start, end)| {
        ContentChange::new(
          Range::new(Self::position(&rope, start), Self::position(&rope, end)),
          text,
        )
      })
      .collect();

    if let Some(renderer) = &self.renderer {
      renderer.carry(&changes);
    }

    for &(start, end) in edits.iter().rev() {
      rope.remove(start..end);
      rope.insert(start, text);
    }

    let inserted = text.chars().count() as isize;
    let mut shift = 0isize;
    let selections: Vec<Selection> = edits
      .iter()
      .map(|&(start, end)| {
        let at = (start as isize + shift) as usize + cursor_offset;
        shift += inserted - (end - start) as isize;
        Selection::point(Self::position(&rope, at))
      })
      .collect();

    *self.selections.borrow_mut() = selections.clone();
    (
      ContentChangeEvent::new(changes),
      SelectionChangeEvent::new(selections),
    )
  }

  /// Move every cursor by `by` characters, merging cursors that meet.
  pub fn move_cursors(&self, by: isize) -> SelectionChangeEvent {
    let rope = self.text.borrow();
    let len = rope.len_chars() as isize;
    let mut cursors: Vec<usize> = self
      .selections
      .borrow()
      .iter()
      .map(|selection| (Self::char_idx(&rope, selection.active) as isize + by).clamp(0, len) as usize)
      .collect();
    cursors.sort_unstable();
    cursors.dedup();

    let selections: Vec<Selection> = cursors
      .into_iter()
      .map(|idx| Selection::point(Self::position(&rope, idx)))
      .collect();
    *self.selections.borrow_mut() = selections.clone();
    SelectionChangeEvent::new(selections)
  }

  pub fn place(&self, selections: Vec<Selection>) -> SelectionChangeEvent {
    *self.selections.borrow_mut() = selections.clone();
    SelectionChangeEvent::new(selections)
  }

  fn take_moved(&self) -> Option<Vec<Selection>> {
    self.moved.borrow_mut().pop_front()
  }
}

impl TextSource for FakeEditor {
  fn text_in(&self, range: Range) -> Option<Cow<'_, str>> {
    self
      .text
      .borrow()
      .text_in(range)
      .map(|text| Cow::Owned(text.into_owned()))
  }
}

impl EditorHost for FakeEditor {
  fn selections(&self) -> Vec<Selection> {
    self.selections.borrow().clone()
  }

  fn set_selections(&self, selections: Vec<Selection>) {
    *self.selections.borrow_mut() = selections.clone();
    self.moved.borrow_mut().push_back(selections);
  }

  fn reveal(&self, range: Range) {
    self.revealed.borrow_mut().push(range);
  }
}

#[derive(Default)]
pub struct RecordingRenderer {
  next:         Cell<u64>,
  live:         RefCell<BTreeMap<u64, Range>>,
  pub applied:  Cell<usize>,
  pub disposed: Cell<usize>,
}

impl RecordingRenderer {
  /// Start of every live decoration, in document order.
  pub fn decorated(&self) -> Vec<Position> {
    let mut starts: Vec<_> = self.live.borrow().values().map(|range| range.start).collect();
    starts.sort();
    starts
  }

  /// Move every live decoration through a batch of changes. Decorations
  /// whose character was overwritten stay put until the tracker disposes
  /// them.
  pub fn carry(&self, changes: &[ContentChange]) {
    let mut live = self.live.borrow_mut();
    let mut ranges: Vec<&mut Range> = live.values_mut().collect();
    ranges.sort_by_key(|range| range.start);

    let mut stack = DeltaStack::new(changes);
    for range in ranges {
      if let Some(start) = stack.shift(range.start) {
        *range = Range::new(start, start.translate(0, 1));
      }
    }
  }

  pub fn live_ranges(&self) -> Vec<Range> {
    let mut ranges: Vec<_> = self.live.borrow().values().copied().collect();
    ranges.sort_by_key(|range| range.start);
    ranges
  }
}

impl DecorationRenderer for RecordingRenderer {
  fn apply(&self, _style: &DecorationStyle, range: Range) -> DecorationId {
    let id = self.next.get() + 1;
    self.next.set(id);
    self.applied.set(self.applied.get() + 1);
    self.live.borrow_mut().insert(id, range);
    DecorationId(id)
  }

  fn dispose(&self, id: DecorationId) {
    let removed = self.live.borrow_mut().remove(&id.0);
    assert!(removed.is_some(), "decoration {id:?} disposed twice");
    self.disposed.set(self.disposed.get() + 1);
  }
}

#[derive(Default)]
pub struct RecordingSink {
  pub log: RefCell<Vec<(ContextKey, bool)>>,
}

impl RecordingSink {
  /// Last value pushed for `key`.
  pub fn value(&self, key: ContextKey) -> Option<bool> {
    self
      .log
      .borrow()
      .iter()
      .rev()
      .find(|(sent, _)| *sent == key)
      .map(|&(_, value)| value)
  }
}

impl ContextSink for RecordingSink {
  fn set_context(&self, key: ContextKey, value: bool) {
    self.log.borrow_mut().push((key, value));
  }
}

pub struct Harness {
  pub editor:     Rc<FakeEditor>,
  pub renderer:   Rc<RecordingRenderer>,
  pub sink:       Rc<RecordingSink>,
  pub queue:      TurnQueue,
  pub controller: Controller,
}

impl Harness {
  pub fn new(text: &str, selections: Vec<Selection>) -> Self {
    Self::with_config(text, selections, Configuration::default())
  }

  pub fn with_config(text: &str, selections: Vec<Selection>, config: Configuration) -> Self {
    let renderer = Rc::new(RecordingRenderer::default());
    let sink = Rc::new(RecordingSink::default());
    let queue = TurnQueue::new();
    let services = Services {
      renderer:  renderer.clone(),
      sink:      sink.clone(),
      scheduler: Rc::new(queue.clone()),
    };

    let editor = FakeEditor::with_renderer(text, selections, renderer.clone());
    let mut controller = Controller::new(services, config);
    controller.set_active_editor(Some(editor.clone()));
    queue.run_pending();

    Self {
      editor,
      renderer,
      sink,
      queue,
      controller,
    }
  }

  /// Report selection moves made by the session, then end the turn.
  pub fn pump(&self) {
    while let Some(selections) = self.editor.take_moved() {
      self
        .controller
        .on_selection_change(&SelectionChangeEvent::new(selections));
    }
    self.queue.run_pending();
  }

  fn report(&self, (content, selection): (ContentChangeEvent, SelectionChangeEvent)) {
    self.controller.on_content_change(&content);
    self.controller.on_selection_change(&selection);
    self.pump();
  }

  /// Autoclose `pair` at every cursor.
  pub fn type_pair(&self, pair: &str) {
    self.report(self.editor.edit(0, pair, 1));
  }

  pub fn type_text(&self, text: &str) {
    self.report(self.editor.edit(0, text, text.chars().count()));
  }

  pub fn backspace(&self) {
    self.report(self.editor.edit(1, "", 0));
  }

  pub fn move_cursors(&self, by: isize) {
    let event = self.editor.move_cursors(by);
    self.controller.on_selection_change(&event);
    self.pump();
  }

  pub fn click(&self, selections: Vec<Selection>) {
    let event = self.editor.place(selections);
    self.controller.on_selection_change(&event);
    self.pump();
  }

  pub fn execute(&self, command: Command) -> bool {
    let done = self.controller.execute(command);
    self.pump();
    done
  }

  pub fn cursors(&self) -> Vec<Position> {
    self
      .editor
      .selections()
      .iter()
      .map(|selection| selection.active)
      .collect()
  }

  /// `(open, close)` of every tracked pair, per cursor.
  pub fn pairs(&self) -> Vec<Vec<(Position, Position)>> {
    self
      .controller
      .session()
      .map(|session| {
        session
          .snapshot()
          .into_iter()
          .map(|cluster| cluster.iter().map(|pair| (pair.open, pair.close)).collect())
          .collect()
      })
      .unwrap_or_default()
  }

  pub fn context(&self, key: ContextKey) -> Option<bool> {
    self.sink.value(key)
  }
}
