//! Remote product synchronization.
//!
//! # Responsibility
//! - Map product names to remote file paths and local slot keys.
//! - Talk to the GitHub Contents API through an injectable transport.
//! - Expose the `ProductRemote` seam the board store depends on.
//!
//! # Invariants
//! - Library calls report every failure outward; fallback policy lives in
//!   the board store.
//! - No automatic retries and no cancellation.

pub mod error;
pub mod github;
pub mod naming;
pub mod remote;
pub mod transport;
