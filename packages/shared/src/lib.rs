//! Utilities shared by the fanout server and the listener client.

pub mod logger;
pub mod time;
