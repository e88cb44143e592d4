//! Data Transfer Objects (DTOs).
//!
//! Outbound WebSocket frames carry the operator's text verbatim, so the only
//! DTOs are the HTTP API responses.

pub mod http;
