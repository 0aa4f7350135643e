//! Persistence boundary for the milestone collection.
//!
//! # Responsibility
//! - Define the durable key-value capability and its implementations.
//! - Translate between the in-memory collection and stored text.
//!
//! # Invariants
//! - The service layer never sees SQL or JSON details.
//! - Medium failures surface as `StorageError`, payload problems as
//!   `CorruptDataError`; the two are never conflated.

pub mod kv_store;
pub mod payload;
pub mod sqlite_kv;
