//! Milestone category enumeration.
//!
//! # Responsibility
//! - Define the closed set of categories a milestone can belong to.
//! - Map wire/legacy labels onto that set with an explicit fallback.
//!
//! # Invariants
//! - Every milestone carries exactly one `Category`.
//! - Unknown labels met while loading collapse to `Category::Other`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Closed category set for milestones.
///
/// Deserializing goes through `from_label_lossy`, so it never fails on an
/// unknown label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Category {
    /// Motor, cognitive, language or social development.
    #[default]
    Development,
    /// Appointments, vaccines, illnesses.
    Health,
    /// Feeding and first foods.
    Nutrition,
    /// Sleep routines and changes.
    Sleep,
    /// Anything else, and the fallback for unrecognized labels.
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 5] = [
        Category::Development,
        Category::Health,
        Category::Nutrition,
        Category::Sleep,
        Category::Other,
    ];

    /// Canonical wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Health => "health",
            Self::Nutrition => "nutrition",
            Self::Sleep => "sleep",
            Self::Other => "other",
        }
    }

    /// Parses a canonical or legacy label.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Returns `None` for labels outside the known vocabulary; callers pick
    /// their own policy (strict rejection or `from_label_lossy`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" | "desenvolvimento" => Some(Self::Development),
            "health" | "saúde" | "saude" => Some(Self::Health),
            "nutrition" | "alimentação" | "alimentacao" => Some(Self::Nutrition),
            "sleep" | "sono" => Some(Self::Sleep),
            "other" | "outro" => Some(Self::Other),
            _ => None,
        }
    }

    /// Parses a label, normalizing anything unrecognized to `Other`.
    pub fn from_label_lossy(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::Other)
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::from_label_lossy(&value)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
