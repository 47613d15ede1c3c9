//! Roadmap domain model.
//!
//! # Responsibility
//! - Define the canonical product/initiative shapes shared by board, store
//!   and remote sync.
//! - Keep the JSON wire shape identical for local slots and remote files.
//!
//! # Invariants
//! - Product names are unique inside one `AppData`.
//! - Initiative ids are unique inside one product.
//! - Stored `x` is never negative and stored `width` never below
//!   `MIN_CARD_WIDTH` once written through the board session.

pub mod initiative;
pub mod product;
