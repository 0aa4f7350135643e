//! Core domain logic for the milestone timeline.
//! This crate is the single source of truth for milestone invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{resolve_db_path, StoreConfig, DEFAULT_STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::Category;
pub use model::filter::{CategoryFilter, FilterConfig};
pub use model::milestone::{
    parse_date, Milestone, MilestoneDraft, MilestoneId, MilestoneUpdate, TitlePolicy,
    ValidationError,
};
pub use repo::kv_store::{KeyValueStore, MemoryKvStore, StorageError, StorageResult};
pub use repo::payload::CorruptDataError;
pub use repo::sqlite_kv::SqliteKvStore;
pub use service::milestone_store::{
    CorruptDataWarning, MilestoneStore, MutationOutcome, PersistenceWarning, StoreError,
    StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
