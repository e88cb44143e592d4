//! UseCase layer: connection lifecycle and broadcast dispatch.

pub mod broadcast_message;
pub mod connect_connection;
pub mod disconnect_connection;
pub mod error;
pub mod get_connections;

pub use broadcast_message::{BroadcastMessageUseCase, BroadcastReport};
pub use connect_connection::ConnectUseCase;
pub use disconnect_connection::DisconnectUseCase;
pub use error::ConnectError;
pub use get_connections::GetConnectionsUseCase;
