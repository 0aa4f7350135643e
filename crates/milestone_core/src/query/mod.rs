//! Read-side projections over the milestone collection.
//!
//! # Invariants
//! - Queries are pure: no store mutation, no storage I/O.

pub mod timeline;
