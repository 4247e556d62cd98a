//! Run lifecycle coordination.
//!
//! The runner owns the single-run state machine; the controller exposes it
//! to front-ends over a command channel.

pub(crate) mod controller;
pub(crate) mod runner;
