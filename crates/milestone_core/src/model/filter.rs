//! Timeline filter configuration.
//!
//! `FilterConfig` is a pure query input. It is never persisted and has no
//! identity.

use super::category::Category;
use super::milestone::Milestone;

/// Category part of a timeline filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Parses `all` or any label accepted by `Category::parse`.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.eq_ignore_ascii_case("todos") {
            return Some(Self::All);
        }
        Category::parse(trimmed).map(Self::Only)
    }

    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == category,
        }
    }
}

/// Filter applied by the timeline query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterConfig {
    pub category: CategoryFilter,
    pub favorites_only: bool,
}

impl FilterConfig {
    /// Filter that keeps every milestone.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(category: Category) -> Self {
        Self {
            category: CategoryFilter::Only(category),
            favorites_only: false,
        }
    }

    pub fn favorites_only(mut self, favorites_only: bool) -> Self {
        self.favorites_only = favorites_only;
        self
    }

    /// Returns whether `milestone` passes both filter clauses.
    pub fn matches(&self, milestone: &Milestone) -> bool {
        self.category.matches(milestone.category) && (!self.favorites_only || milestone.favorite)
    }
}
