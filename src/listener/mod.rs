//! Listener controller module
//!
//! Owns the listening lifecycle: it drives the recognition engine, queues
//! finalized sentences for the caller, and restarts the engine when a
//! session ends on its own or the active language changes.

mod controller;

pub use controller::{Command, Controller, ListeningState, StatusSnapshot};
