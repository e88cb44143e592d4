//! Listener client for the fanout broadcast server.
//!
//! Connects to the server, prints every frame it receives and reconnects when
//! the connection drops.

pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;

pub use runner::{ReconnectPolicy, run_client};
