//! Milestone store: the single writer of the milestone collection.
//!
//! # Responsibility
//! - Hydrate the collection from durable storage once at startup.
//! - Execute create/update/delete/toggle-favorite against memory.
//! - Write the full collection through to storage after every mutation.
//!
//! # Invariants
//! - Ids are unique across the live collection at all times.
//! - Failed validation or lookup leaves the collection untouched.
//! - A failed storage write never rolls back the in-memory change; it is
//!   reported as a `PersistenceWarning` on the successful outcome.
//! - Empty collections are written like any other.
//! - After an unreadable load, writes are refused until `load` succeeds, so
//!   a transient read failure never replaces the stored collection.
//! - Logs carry ids and counts only, never milestone text.

use crate::config::StoreConfig;
use crate::model::filter::FilterConfig;
use crate::model::milestone::{
    Milestone, MilestoneDraft, MilestoneId, MilestoneUpdate, ValidationError,
};
use crate::query::timeline;
use crate::repo::kv_store::{KeyValueStore, StorageError};
use crate::repo::payload::{self, CorruptDataError};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by store operations that abort without effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced milestone does not exist.
    NotFound(MilestoneId),
    /// Input violates the configured title policy.
    Validation(ValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "milestone not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Startup could not use the stored collection and began empty.
#[derive(Debug)]
pub enum CorruptDataWarning {
    /// Stored text exists but is not a valid milestone payload.
    Malformed(CorruptDataError),
    /// The medium could not be read at all.
    Unreadable(StorageError),
}

impl Display for CorruptDataWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "discarded unreadable milestone data: {err}"),
            Self::Unreadable(err) => write!(f, "could not read milestone data: {err}"),
        }
    }
}

impl Error for CorruptDataWarning {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::Unreadable(err) => Some(err),
        }
    }
}

/// A mutation was applied in memory but could not be written out.
#[derive(Debug)]
pub struct PersistenceWarning {
    pub key: String,
    pub source: StorageError,
}

impl Display for PersistenceWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "milestones changed in memory but were not saved under `{}`: {}",
            self.key, self.source
        )
    }
}

impl Error for PersistenceWarning {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Successful mutation result plus the outcome of its write-through.
#[derive(Debug)]
pub struct MutationOutcome<T> {
    pub value: T,
    /// `Some` when the durable write failed.
    pub warning: Option<PersistenceWarning>,
}

impl<T> MutationOutcome<T> {
    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// In-memory milestone collection backed by a key-value medium.
pub struct MilestoneStore<S: KeyValueStore> {
    storage: S,
    config: StoreConfig,
    milestones: Vec<Milestone>,
    read_only: bool,
}

impl<S: KeyValueStore> MilestoneStore<S> {
    /// Creates an empty store. Call `load` to hydrate it.
    pub fn new(storage: S, config: StoreConfig) -> Self {
        Self {
            storage,
            config,
            milestones: Vec::new(),
            read_only: false,
        }
    }

    /// Creates a store and hydrates it in one step.
    pub fn open(storage: S, config: StoreConfig) -> (Self, Option<CorruptDataWarning>) {
        let mut store = Self::new(storage, config);
        let warning = store.load();
        (store, warning)
    }

    /// Replaces the in-memory collection with the stored one.
    ///
    /// Never fails: a missing key yields an empty collection, and unreadable
    /// or malformed data yields an empty collection plus a warning. The bad
    /// payload is left in storage until the next successful write.
    ///
    /// An unreadable medium also makes the store read-only until a later
    /// `load` succeeds.
    pub fn load(&mut self) -> Option<CorruptDataWarning> {
        let key = self.config.storage_key.as_str();
        self.read_only = false;
        let payload = match self.storage.read(key) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                self.milestones = Vec::new();
                info!("event=milestones_load module=store status=ok source=absent count=0");
                return None;
            }
            Err(err) => {
                self.milestones = Vec::new();
                self.read_only = true;
                warn!(
                    "event=milestones_load module=store status=warn reason=unreadable key={} error={}",
                    key, err
                );
                return Some(CorruptDataWarning::Unreadable(err));
            }
        };

        match payload::deserialize(&payload) {
            Ok(decoded) => {
                self.milestones = dedupe_by_id(decoded);
                info!(
                    "event=milestones_load module=store status=ok source=storage count={}",
                    self.milestones.len()
                );
                None
            }
            Err(err) => {
                self.milestones = Vec::new();
                warn!(
                    "event=milestones_load module=store status=warn reason=corrupt key={} bytes={} error={}",
                    key,
                    payload.len(),
                    err
                );
                Some(CorruptDataWarning::Malformed(err))
            }
        }
    }

    /// Returns an owned snapshot of the collection in stored order.
    pub fn all(&self) -> Vec<Milestone> {
        self.milestones.clone()
    }

    /// Returns a copy of one milestone.
    pub fn get(&self, id: &MilestoneId) -> Option<Milestone> {
        self.position(id).map(|index| self.milestones[index].clone())
    }

    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// `true` after a load that could not read the medium.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Filtered, newest-first view of the current collection.
    pub fn query(&self, filter: &FilterConfig) -> Vec<Milestone> {
        timeline::query(&self.milestones, filter)
    }

    /// Creates a milestone with a fresh id and `favorite == false`.
    ///
    /// # Errors
    /// - `Validation` when the title violates the configured policy.
    pub fn create(&mut self, draft: MilestoneDraft) -> StoreResult<MutationOutcome<Milestone>> {
        draft.validate(self.config.title_policy)?;
        let mut milestone = Milestone::from_draft(draft);
        while self.position(&milestone.id).is_some() {
            milestone.id = MilestoneId::generate();
        }

        self.milestones.push(milestone.clone());
        info!(
            "event=milestone_create module=store status=ok id={} count={}",
            milestone.id,
            self.milestones.len()
        );
        Ok(self.write_through(milestone))
    }

    /// Replaces the mutable fields of an existing milestone.
    ///
    /// # Errors
    /// - `NotFound` when `id` is unknown.
    /// - `Validation` when the title violates the configured policy.
    pub fn update(
        &mut self,
        id: &MilestoneId,
        update: MilestoneUpdate,
    ) -> StoreResult<MutationOutcome<Milestone>> {
        let index = self.require(id)?;
        update.validate(self.config.title_policy)?;

        let milestone = &mut self.milestones[index];
        milestone.apply(update);
        let updated = milestone.clone();
        info!("event=milestone_update module=store status=ok id={id}");
        Ok(self.write_through(updated))
    }

    /// Removes a milestone and returns it.
    ///
    /// # Errors
    /// - `NotFound` when `id` is unknown, including a repeated delete.
    pub fn delete(&mut self, id: &MilestoneId) -> StoreResult<MutationOutcome<Milestone>> {
        let index = self.require(id)?;
        let removed = self.milestones.remove(index);
        info!(
            "event=milestone_delete module=store status=ok id={} count={}",
            id,
            self.milestones.len()
        );
        Ok(self.write_through(removed))
    }

    /// Flips the favorite flag of a milestone.
    ///
    /// # Errors
    /// - `NotFound` when `id` is unknown.
    pub fn toggle_favorite(&mut self, id: &MilestoneId) -> StoreResult<MutationOutcome<Milestone>> {
        let index = self.require(id)?;
        let milestone = &mut self.milestones[index];
        let favorite = milestone.toggle_favorite();
        let toggled = milestone.clone();
        info!("event=milestone_favorite module=store status=ok id={id} favorite={favorite}");
        Ok(self.write_through(toggled))
    }

    /// Writes the full collection to storage.
    ///
    /// Mutations call this implicitly; callers use it to retry after a
    /// `PersistenceWarning`. Refused while the store is read-only.
    pub fn save(&self) -> Result<(), PersistenceWarning> {
        let key = self.config.storage_key.as_str();
        let result = if self.read_only {
            Err(StorageError::ContentsUnread)
        } else {
            self.storage.write(key, &payload::serialize(&self.milestones))
        };
        match result {
            Ok(()) => Ok(()),
            Err(source) => {
                warn!(
                    "event=milestones_save module=store status=warn key={} count={} error={}",
                    key,
                    self.milestones.len(),
                    source
                );
                Err(PersistenceWarning {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    fn write_through<T>(&self, value: T) -> MutationOutcome<T> {
        MutationOutcome {
            value,
            warning: self.save().err(),
        }
    }

    fn position(&self, id: &MilestoneId) -> Option<usize> {
        self.milestones
            .iter()
            .position(|milestone| &milestone.id == id)
    }

    fn require(&self, id: &MilestoneId) -> StoreResult<usize> {
        self.position(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

fn dedupe_by_id(milestones: Vec<Milestone>) -> Vec<Milestone> {
    let mut seen = HashSet::with_capacity(milestones.len());
    let mut kept = Vec::with_capacity(milestones.len());
    for milestone in milestones {
        if seen.insert(milestone.id.clone()) {
            kept.push(milestone);
        } else {
            warn!(
                "event=milestones_load module=store status=warn reason=duplicate_id id={}",
                milestone.id
            );
        }
    }
    kept
}
