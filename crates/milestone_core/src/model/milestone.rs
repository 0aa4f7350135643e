//! Milestone domain model.
//!
//! # Responsibility
//! - Define the canonical milestone record and its create/update inputs.
//! - Own title-policy validation shared by every write path.
//!
//! # Invariants
//! - `id` is assigned once and never changes for the milestone lifetime.
//! - New milestones start with `favorite == false`.
//! - Dates are calendar dates only; no "not in the future" check exists.

use super::category::Category;
use chrono::NaiveDate;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Wire and input format for milestone dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an ISO `YYYY-MM-DD` calendar date, ignoring surrounding whitespace.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Opaque milestone identifier.
///
/// Freshly created milestones receive a random UUID string. Identifiers read
/// back from storage are kept verbatim, so ids written by earlier app
/// versions (millisecond timestamps) stay addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MilestoneId(String);

impl MilestoneId {
    /// Generates a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier.
    ///
    /// Returns `None` for blank input.
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return None;
        }
        Some(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MilestoneId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How strictly write paths treat milestone titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitlePolicy {
    /// Blank titles are rejected with `ValidationError::EmptyTitle`.
    #[default]
    RequireNonEmpty,
    /// Any title is accepted; callers enforce their own rules.
    AllowEmpty,
}

/// Validation failure for milestone write inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "milestone title cannot be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Canonical milestone record.
///
/// `Serialize` produces the persisted record shape directly; reading goes
/// through the lenient record parser in `repo::payload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub id: MilestoneId,
    pub title: String,
    pub description: String,
    /// Serialized as ISO `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub category: Category,
    pub favorite: bool,
}

impl Milestone {
    /// Builds a new, non-favorite milestone with a generated id.
    pub fn from_draft(draft: MilestoneDraft) -> Self {
        Self::with_id(MilestoneId::generate(), draft)
    }

    /// Builds a non-favorite milestone with a caller-provided id.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(id: MilestoneId, draft: MilestoneDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            category: draft.category,
            favorite: false,
        }
    }

    /// Applies a full-replacement update. `id` is never touched.
    pub fn apply(&mut self, update: MilestoneUpdate) {
        self.title = update.title;
        self.description = update.description;
        self.date = update.date;
        self.category = update.category;
        if let Some(favorite) = update.favorite {
            self.favorite = favorite;
        }
    }

    /// Flips the favorite flag and returns the new value.
    pub fn toggle_favorite(&mut self) -> bool {
        self.favorite = !self.favorite;
        self.favorite
    }
}

/// Input for creating a milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneDraft {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub category: Category,
}

impl MilestoneDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate, category: Category) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            date,
            category,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Checks the title against `policy`. The title is stored as given.
    pub fn validate(&self, policy: TitlePolicy) -> Result<(), ValidationError> {
        validate_title(&self.title, policy)
    }
}

/// Input for updating a milestone.
///
/// Text, date and category use full replacement semantics; `favorite` is
/// only changed when explicitly provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneUpdate {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub category: Category,
    pub favorite: Option<bool>,
}

impl MilestoneUpdate {
    /// Checks the title against `policy`. The title is stored as given.
    pub fn validate(&self, policy: TitlePolicy) -> Result<(), ValidationError> {
        validate_title(&self.title, policy)
    }
}

impl From<MilestoneDraft> for MilestoneUpdate {
    fn from(draft: MilestoneDraft) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            date: draft.date,
            category: draft.category,
            favorite: None,
        }
    }
}

fn validate_title(title: &str, policy: TitlePolicy) -> Result<(), ValidationError> {
    if policy == TitlePolicy::RequireNonEmpty && title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}
