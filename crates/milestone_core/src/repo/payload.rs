//! Milestone collection payload codec.
//!
//! # Responsibility
//! - Encode the whole collection as one JSON array stored under a single key.
//! - Decode stored text back into milestones, or report why it is unusable.
//!
//! # Invariants
//! - Encoding round-trips every field, `favorite` and `category` included.
//! - Decoding is all-or-nothing: a single bad record rejects the payload.
//! - Unknown record fields are ignored.
//! - Unknown category labels decode as `Category::Other`.

use crate::model::category::Category;
use crate::model::milestone::{parse_date, Milestone, MilestoneId, DATE_FORMAT};
use serde::Deserialize;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stored payload could not be turned into a milestone collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorruptDataError {
    /// Text is not valid JSON.
    Syntax(String),
    /// Top-level JSON value is not an array.
    NotASequence,
    /// A record is not an object, misses a required field, or has a
    /// field of the wrong type.
    InvalidRecord { index: usize, reason: String },
    /// A record's `date` is not an ISO calendar date.
    InvalidDate { index: usize, value: String },
}

impl Display for CorruptDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(message) => write!(f, "milestone payload is not valid JSON: {message}"),
            Self::NotASequence => write!(f, "milestone payload is not a JSON array"),
            Self::InvalidRecord { index, reason } => {
                write!(f, "invalid milestone record at index {index}: {reason}")
            }
            Self::InvalidDate { index, value } => write!(
                f,
                "invalid milestone date `{value}` at index {index}; expected YYYY-MM-DD"
            ),
        }
    }
}

impl Error for CorruptDataError {}

/// Persisted record shape as read back from storage.
#[derive(Debug, Deserialize)]
struct StoredRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    date: String,
    category: String,
    #[serde(default)]
    favorite: bool,
}

/// Encodes the full collection.
pub fn serialize(milestones: &[Milestone]) -> String {
    let records = milestones.iter().map(encode_record).collect::<Vec<_>>();
    Value::Array(records).to_string()
}

/// Decodes a stored payload.
///
/// # Errors
/// Returns `CorruptDataError` for structurally invalid text; never returns a
/// partially decoded collection.
pub fn deserialize(payload: &str) -> Result<Vec<Milestone>, CorruptDataError> {
    let root: Value = serde_json::from_str(payload)
        .map_err(|err| CorruptDataError::Syntax(err.to_string()))?;
    let Value::Array(items) = root else {
        return Err(CorruptDataError::NotASequence);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| decode_record(index, item))
        .collect()
}

fn encode_record(milestone: &Milestone) -> Value {
    json!({
        "id": milestone.id.as_str(),
        "title": milestone.title,
        "description": milestone.description,
        "date": milestone.date.format(DATE_FORMAT).to_string(),
        "category": milestone.category.as_str(),
        "favorite": milestone.favorite,
    })
}

fn decode_record(index: usize, item: Value) -> Result<Milestone, CorruptDataError> {
    if !item.is_object() {
        return Err(CorruptDataError::InvalidRecord {
            index,
            reason: "record is not an object".to_string(),
        });
    }

    let record: StoredRecord =
        serde_json::from_value(item).map_err(|err| CorruptDataError::InvalidRecord {
            index,
            reason: err.to_string(),
        })?;

    let id = MilestoneId::parse(record.id).ok_or_else(|| CorruptDataError::InvalidRecord {
        index,
        reason: "id cannot be empty".to_string(),
    })?;
    let date = parse_date(&record.date).ok_or_else(|| CorruptDataError::InvalidDate {
        index,
        value: record.date.clone(),
    })?;

    Ok(Milestone {
        id,
        title: record.title,
        description: record.description,
        date,
        category: Category::from_label_lossy(&record.category),
        favorite: record.favorite,
    })
}
