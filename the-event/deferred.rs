//! Single-shot deferred callbacks with coalescing.
//!
//! A [`DeferredTimer`] runs its callback once, at the next point the host
//! yields control back to its task queue. Arming an already armed timer is a
//! no-op, so any number of [`DeferredTimer::schedule`] calls made during one
//! processing turn collapse into a single callback that observes only the
//! final state of that turn.
//!
//! Where "the next point the host yields" lies is decided by a [`Scheduler`]:
//!
//! - [`TurnQueue`] is a plain run queue the host drains itself once it has
//!   finished dispatching an event. Useful for synchronous hosts and tests.
//! - [`LocalSpawner`] hands the task to the current tokio `LocalSet`, so it
//!   runs the next time the local executor gets to poll.
//!
//! ```ignore
//! let queue = TurnQueue::new();
//! let timer = DeferredTimer::new(Rc::new(queue.clone()), || println!("flush"));
//!
//! timer.schedule();
//! timer.schedule(); // coalesced
//! queue.run_pending(); // prints "flush" once
//! ```

use std::{
  cell::{
    Cell,
    RefCell,
  },
  collections::VecDeque,
  fmt,
  rc::Rc,
};

pub type Task = Box<dyn FnOnce() + 'static>;

/// Something that can run a task once the current turn is over.
pub trait Scheduler {
  fn defer(&self, task: Task);
}

/// A run queue drained explicitly by the host at the end of each turn.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct TurnQueue {
  tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TurnQueue {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.tasks.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.borrow().is_empty()
  }

  /// Run queued tasks until the queue is empty, including tasks queued by the
  /// tasks being run. Returns how many tasks ran.
  pub fn run_pending(&self) -> usize {
    let mut ran = 0;
    loop {
      // The borrow must end before the task runs: tasks may queue more tasks.
      let Some(task) = self.tasks.borrow_mut().pop_front() else {
        break;
      };
      task();
      ran += 1;
    }
    ran
  }
}

impl Scheduler for TurnQueue {
  fn defer(&self, task: Task) {
    self.tasks.borrow_mut().push_back(task);
  }
}

impl fmt::Debug for TurnQueue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TurnQueue")
      .field("pending", &self.len())
      .finish()
  }
}

/// Spawns deferred tasks onto the current tokio `LocalSet`.
///
/// # Panics
///
/// [`Scheduler::defer`] panics when called outside of a `LocalSet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSpawner;

impl Scheduler for LocalSpawner {
  fn defer(&self, task: Task) {
    tokio::task::spawn_local(async move { task() });
  }
}

#[derive(Debug, Default)]
struct TimerState {
  armed: Cell<bool>,
  /// Bumped on every arm so a task left over from a cancelled arm never fires.
  epoch: Cell<u64>,
}

/// A reusable single-shot timer that fires at the end of the current turn.
pub struct DeferredTimer {
  scheduler: Rc<dyn Scheduler>,
  state:     Rc<TimerState>,
  callback:  Rc<dyn Fn()>,
}

impl DeferredTimer {
  pub fn new(scheduler: Rc<dyn Scheduler>, callback: impl Fn() + 'static) -> Self {
    Self {
      scheduler,
      state: Rc::default(),
      callback: Rc::new(callback),
    }
  }

  pub fn is_armed(&self) -> bool {
    self.state.armed.get()
  }

  /// Arm the timer unless it is already armed.
  pub fn schedule(&self) {
    if self.state.armed.replace(true) {
      return;
    }

    let epoch = self.state.epoch.get().wrapping_add(1);
    self.state.epoch.set(epoch);

    let state = Rc::clone(&self.state);
    let callback = Rc::clone(&self.callback);
    self.scheduler.defer(Box::new(move || {
      if !state.armed.get() || state.epoch.get() != epoch {
        log::trace!("deferred task {epoch} discarded");
        return;
      }
      state.armed.set(false);
      log::trace!("deferred task {epoch} fired");
      callback();
    }));
  }

  /// Disarm without firing. Does nothing if the timer is not armed.
  pub fn cancel(&self) {
    self.state.armed.set(false);
  }
}

impl Drop for DeferredTimer {
  fn drop(&mut self) {
    self.cancel();
  }
}

impl fmt::Debug for DeferredTimer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DeferredTimer")
      .field("armed", &self.state.armed.get())
      .field("epoch", &self.state.epoch.get())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn counting_timer(scheduler: Rc<dyn Scheduler>) -> (DeferredTimer, Rc<Cell<usize>>) {
    let fired = Rc::new(Cell::new(0));
    let counter = Rc::clone(&fired);
    let timer = DeferredTimer::new(scheduler, move || counter.set(counter.get() + 1));
    (timer, fired)
  }

  #[test]
  fn schedules_are_coalesced() {
    let queue = TurnQueue::new();
    let (timer, fired) = counting_timer(Rc::new(queue.clone()));

    timer.schedule();
    timer.schedule();
    timer.schedule();
    assert!(timer.is_armed());
    assert_eq!(queue.len(), 1);

    assert_eq!(queue.run_pending(), 1);
    assert_eq!(fired.get(), 1);
    assert!(!timer.is_armed());
  }

  #[test]
  fn rearms_after_firing() {
    let queue = TurnQueue::new();
    let (timer, fired) = counting_timer(Rc::new(queue.clone()));

    timer.schedule();
    queue.run_pending();
    timer.schedule();
    queue.run_pending();
    assert_eq!(fired.get(), 2);
  }

  #[test]
  fn cancel_disarms_without_firing() {
    let queue = TurnQueue::new();
    let (timer, fired) = counting_timer(Rc::new(queue.clone()));

    timer.schedule();
    timer.cancel();
    assert!(!timer.is_armed());
    queue.run_pending();
    assert_eq!(fired.get(), 0);
  }

  #[test]
  fn rearm_after_cancel_fires_once() {
    let queue = TurnQueue::new();
    let (timer, fired) = counting_timer(Rc::new(queue.clone()));

    timer.schedule();
    timer.cancel();
    timer.schedule();
    // Both the stale and the fresh task are queued; only the fresh one fires.
    assert_eq!(queue.len(), 2);
    queue.run_pending();
    assert_eq!(fired.get(), 1);
  }

  #[test]
  fn dropped_timer_never_fires() {
    let queue = TurnQueue::new();
    let (timer, fired) = counting_timer(Rc::new(queue.clone()));

    timer.schedule();
    drop(timer);
    queue.run_pending();
    assert_eq!(fired.get(), 0);
  }

  #[test]
  fn tasks_queued_while_draining_run_in_the_same_drain() {
    let queue = TurnQueue::new();
    let ran = Rc::new(Cell::new(0));

    let inner_queue = queue.clone();
    let inner_ran = Rc::clone(&ran);
    queue.defer(Box::new(move || {
      inner_ran.set(inner_ran.get() + 1);
      let again = Rc::clone(&inner_ran);
      inner_queue.defer(Box::new(move || again.set(again.get() + 1)));
    }));

    assert_eq!(queue.run_pending(), 2);
    assert_eq!(ran.get(), 2);
    assert!(queue.is_empty());
  }

  #[tokio::test(flavor = "current_thread")]
  async fn local_spawner_fires_after_yield() {
    let local = tokio::task::LocalSet::new();
    local
      .run_until(async {
        let (timer, fired) = counting_timer(Rc::new(LocalSpawner));

        timer.schedule();
        timer.schedule();
        assert_eq!(fired.get(), 0);

        for _ in 0..4 {
          tokio::task::yield_now().await;
        }
        assert_eq!(fired.get(), 1);
        assert!(!timer.is_armed());
      })
      .await;
  }
}
