//! Board rendering math and interaction state.
//!
//! # Responsibility
//! - Derive card colors from one base color.
//! - Map stored `(x, score, width)` to pixels and pointer motion back.
//! - Track the single active drag/resize and the single open modal.
//!
//! # Invariants
//! - Everything here is pure or session-local; persistence happens only
//!   through `service::board_store`.

pub mod color;
pub mod geometry;
pub mod session;
pub mod zoom;
