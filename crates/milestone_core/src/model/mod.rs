//! Domain model for the milestone timeline.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep wire naming and validation rules next to the types they govern.
//!
//! # Invariants
//! - Every milestone is identified by a stable `MilestoneId`.
//! - Display order is derived by queries, never stored on the model.

pub mod category;
pub mod filter;
pub mod milestone;
