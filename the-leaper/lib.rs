//! Tracking of autoclosed bracket and quote pairs under multiple cursors.
//!
//! When the host editor autocloses a pair (typing `(` inserts `()` with the
//! cursor in between), the pair is tracked until the cursor leaves it, the
//! pair is edited away, or an edit splits it across lines. While a cursor sits
//! inside a tracked pair with nothing but whitespace before the closing side,
//! it can *leap* past that closing side.
//!
//! - [`tracker::Tracker`] keeps the pairs in sync with selection and content
//!   changes without rescanning the document.
//! - [`session::Session`] binds a tracker to one editor and runs the leap and
//!   escape commands.
//! - [`controller::Controller`] follows the active editor and owns the
//!   configuration.

use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod change;
pub mod command;
pub mod config;
pub mod controller;
pub mod decoration;
pub mod delta;
pub mod host;
pub mod pair;
pub mod position;
pub mod selection;
pub mod session;
pub mod text;
pub mod tracker;

pub type Tendril = SmartString<LazyCompact>;
