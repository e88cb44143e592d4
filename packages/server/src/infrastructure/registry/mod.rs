//! ConnectionRegistry の実装
//!
//! - `inmemory`: `HashMap` を Mutex で保護したインメモリ実装

pub mod inmemory;

pub use inmemory::InMemoryConnectionRegistry;
