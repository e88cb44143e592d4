//! UseCase layer errors.

use thiserror::Error;

use crate::domain::RegistryError;

/// Errors while registering a freshly accepted connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Failed to register connection: {0}")]
    Registry(#[from] RegistryError),
}
