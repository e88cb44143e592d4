//! Domain layer: connections, outbound messages and the registry abstraction.
//!
//! The domain layer has no knowledge of axum or of the concrete registry
//! storage. The infrastructure layer implements [`ConnectionRegistry`] and the
//! UI layer owns the sockets behind each [`PusherChannel`].

pub mod entity;
pub mod error;
pub mod registry;
pub mod value_object;

pub use entity::{ConnectionHandle, ConnectionState, Delivery, PusherChannel, PusherReceiver};
pub use error::{ConnectionStateError, DeliveryError, RegistryError};
pub use registry::ConnectionRegistry;
pub use value_object::{ConnectionId, ConnectionIdFactory, OutboundMessage, Timestamp};

#[cfg(test)]
pub use registry::MockConnectionRegistry;
