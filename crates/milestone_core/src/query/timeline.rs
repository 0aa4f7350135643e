//! Timeline query: filter and order milestones for display.
//!
//! # Responsibility
//! - Apply a `FilterConfig` to a collection snapshot.
//! - Order results newest-first by calendar date.
//!
//! # Invariants
//! - Sorting is stable: equal dates keep their relative collection order.
//! - Results are recomputed on every call; nothing is cached.

use crate::model::filter::FilterConfig;
use crate::model::milestone::Milestone;
use std::cmp::Reverse;

/// Returns the milestones passing `filter`, newest date first.
pub fn query(milestones: &[Milestone], filter: &FilterConfig) -> Vec<Milestone> {
    let mut visible = milestones
        .iter()
        .filter(|milestone| filter.matches(milestone))
        .cloned()
        .collect::<Vec<_>>();
    // `sort_by_key` is stable.
    visible.sort_by_key(|milestone| Reverse(milestone.date));
    visible
}
