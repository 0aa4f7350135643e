//! Core use-case services.
//!
//! # Responsibility
//! - Own the milestone collection and its write-through persistence.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod milestone_store;
