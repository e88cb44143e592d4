//! UI layer: WebSocket/HTTP endpoints, operator input and the server runner.

mod error;
mod handler;
pub mod operator;
mod server;
mod signal;
mod state;

pub use error::ServerError;
pub use server::Server;
