//! End-of-turn deferred callbacks for single-threaded, event-driven hosts.

pub mod deferred;

pub use deferred::{
  DeferredTimer,
  LocalSpawner,
  Scheduler,
  TurnQueue,
};
