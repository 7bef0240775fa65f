//! One tracker bound to one editor.
//!
//! A [`Session`] forwards the editor's events to its [`Tracker`], runs the
//! leap and escape commands, and keeps the host informed through two context
//! keys. Context values and decorations are pushed from a [`DeferredTimer`],
//! so however many events arrive during one turn, the host sees only the
//! state at the end of it.

use std::{
  cell::RefCell,
  fmt,
  rc::{
    Rc,
    Weak,
  },
};

use the_event::{
  DeferredTimer,
  Scheduler,
};

use crate::{
  change::{
    ContentChangeEvent,
    SelectionChangeEvent,
  },
  command::Command,
  config::Configuration,
  decoration::DecorationRenderer,
  host::{
    ContextKey,
    ContextSink,
    EditorHost,
  },
  pair::PairSnapshot,
  selection::Selection,
  tracker::Tracker,
};

/// Host services shared by every session.
#[derive(Clone)]
pub struct Services {
  pub renderer:  Rc<dyn DecorationRenderer>,
  pub sink:      Rc<dyn ContextSink>,
  pub scheduler: Rc<dyn Scheduler>,
}

impl fmt::Debug for Services {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Services").finish_non_exhaustive()
  }
}

struct State {
  host:              Rc<dyn EditorHost>,
  sink:              Rc<dyn ContextSink>,
  tracker:           Tracker,
  /// Lazily computed; `None` after any change to the tracker.
  in_leaper_mode:    Option<bool>,
  has_line_of_sight: Option<bool>,
  /// Last value pushed for each context key.
  sent:              [Option<bool>; ContextKey::ALL.len()],
  disposed:          bool,
}

impl State {
  fn invalidate(&mut self) {
    self.in_leaper_mode = None;
    self.has_line_of_sight = None;
  }

  fn in_leaper_mode(&mut self) -> bool {
    *self
      .in_leaper_mode
      .get_or_insert_with(|| self.tracker.has_pairs())
  }

  fn has_line_of_sight(&mut self) -> bool {
    if let Some(value) = self.has_line_of_sight {
      return value;
    }
    let value = self.tracker.has_line_of_sight(&*self.host);
    self.has_line_of_sight = Some(value);
    value
  }

  fn context(&mut self, key: ContextKey) -> bool {
    match key {
      ContextKey::InLeaperMode => self.in_leaper_mode(),
      ContextKey::HasLineOfSight => self.has_line_of_sight(),
    }
  }

  /// Bring decorations up to date and collect the context values that
  /// differ from the ones last pushed.
  fn flush(&mut self) -> Vec<(ContextKey, bool)> {
    self.tracker.sync_decorations();

    let mut updates = Vec::new();
    for key in ContextKey::ALL {
      let value = self.context(key);
      let sent = &mut self.sent[key as usize];
      if *sent != Some(value) {
        *sent = Some(value);
        updates.push((key, value));
      }
    }
    updates
  }
}

/// Flush with the state released, so the sink is free to call back in.
fn flush(state: &RefCell<State>) {
  let (sink, updates) = {
    let mut state = state.borrow_mut();
    let updates = state.flush();
    (Rc::clone(&state.sink), updates)
  };
  for (key, value) in updates {
    tracing::debug!(%key, value, "context changed");
    sink.set_context(key, value);
  }
}

pub struct Session {
  state: Rc<RefCell<State>>,
  timer: DeferredTimer,
}

impl Session {
  pub fn new(host: Rc<dyn EditorHost>, services: &Services, config: Configuration) -> Self {
    let selections = host.selections();
    tracing::trace!(cursors = selections.len(), "starting session");

    let state = Rc::new(RefCell::new(State {
      tracker: Tracker::new(&selections, config, Rc::clone(&services.renderer)),
      host,
      sink: Rc::clone(&services.sink),
      in_leaper_mode: None,
      has_line_of_sight: None,
      sent: [None; ContextKey::ALL.len()],
      disposed: false,
    }));

    let weak: Weak<RefCell<State>> = Rc::downgrade(&state);
    let timer = DeferredTimer::new(Rc::clone(&services.scheduler), move || {
      if let Some(state) = weak.upgrade() {
        flush(&state);
      }
    });

    let session = Self { state, timer };
    session.timer.schedule();
    session
  }

  /// Apply `f` to the tracker, then schedule a flush. Ignored once disposed.
  fn update(&self, f: impl FnOnce(&mut Tracker)) {
    {
      let mut state = self.state.borrow_mut();
      if state.disposed {
        return;
      }
      f(&mut state.tracker);
      state.invalidate();
    }
    self.timer.schedule();
  }

  pub fn on_selection_change(&self, event: &SelectionChangeEvent) {
    self.update(|tracker| tracker.sync_to_selection_changes(&event.selections));
  }

  pub fn on_content_change(&self, event: &ContentChangeEvent) {
    self.update(|tracker| tracker.sync_to_content_changes(event));
  }

  pub fn change_configuration(&self, config: Configuration) {
    self.update(|tracker| tracker.change_configuration(config));
  }

  /// At least one pair is tracked.
  pub fn in_leaper_mode(&self) -> bool {
    self.state.borrow_mut().in_leaper_mode()
  }

  /// Every cursor with a pair sees only whitespace up to the pair's closing
  /// side.
  pub fn has_line_of_sight(&self) -> bool {
    self.state.borrow_mut().has_line_of_sight()
  }

  /// Move every cursor that has a pair past that pair's closing side.
  ///
  /// Both context values are re-evaluated here rather than trusting what was
  /// last pushed: the host may not have applied it yet. Returns whether the
  /// cursors were moved.
  pub fn leap(&self) -> bool {
    let (host, selections) = {
      let mut state = self.state.borrow_mut();
      if state.disposed || !state.in_leaper_mode() || !state.has_line_of_sight() {
        tracing::trace!("nothing to leap out of");
        return false;
      }

      let mut selections = state.host.selections();
      let innermost = state.tracker.innermost_pairs();
      if selections.len() != innermost.len() {
        tracing::debug!(
          host = selections.len(),
          tracked = innermost.len(),
          "cursors out of sync, not leaping"
        );
        return false;
      }

      for (selection, pair) in selections.iter_mut().zip(innermost) {
        if let Some(pair) = pair {
          *selection = Selection::point(pair.close.translate(0, 1));
        }
      }
      (Rc::clone(&state.host), selections)
    };

    tracing::debug!(cursors = selections.len(), "leaping");
    host.set_selections(selections);
    if let [only] = host.selections().as_slice() {
      host.reveal(only.range());
    }
    true
  }

  /// Untrack every pair. Returns whether there was anything to untrack.
  pub fn escape_leaper_mode(&self) -> bool {
    if !self.in_leaper_mode() {
      return false;
    }
    self.update(Tracker::untrack_pairs);
    true
  }

  pub fn execute(&self, command: Command) -> bool {
    tracing::trace!(%command, "executing");
    match command {
      Command::Leap => self.leap(),
      Command::EscapeLeaperMode => self.escape_leaper_mode(),
    }
  }

  /// Push decorations and context values now instead of at the end of the
  /// turn.
  pub fn flush(&self) {
    self.timer.cancel();
    flush(&self.state);
  }

  /// Tracked pairs of each cursor, in the host's cursor order.
  pub fn snapshot(&self) -> Vec<Vec<PairSnapshot>> {
    self.state.borrow().tracker.snapshot()
  }

  pub fn is_disposed(&self) -> bool {
    self.state.borrow().disposed
  }

  /// Remove every decoration and reset the context keys. Later events and
  /// commands are ignored.
  pub fn dispose(&self) {
    {
      let mut state = self.state.borrow_mut();
      if state.disposed {
        return;
      }
      tracing::trace!("disposing session");
      state.tracker.untrack_pairs();
      state.invalidate();
    }
    self.flush();
    self.state.borrow_mut().disposed = true;
  }
}

impl Drop for Session {
  fn drop(&mut self) {
    self.dispose();
  }
}

impl fmt::Debug for Session {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.state.borrow();
    f.debug_struct("Session")
      .field("tracker", &state.tracker)
      .field("sent", &state.sent)
      .field("disposed", &state.disposed)
      .field("timer", &self.timer)
      .finish()
  }
}
