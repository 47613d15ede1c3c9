//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate model, local slots and remote sync into board-level APIs.
//! - Keep UI shells decoupled from storage and transport details.

pub mod board_store;
