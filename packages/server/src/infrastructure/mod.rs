//! Infrastructure layer: concrete implementations of domain traits and DTOs.

pub mod dto;
pub mod registry;
