//! Broadcast fan-out server library.
//!
//! Accepts WebSocket connections and forwards every line the operator enters
//! on standard input to all of them as a text frame.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
