//! Local persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the injected key-value store used for board slots.
//! - Isolate SQLite query details from the board store.

pub mod kv_store;
