//! FFI use-case API for the timeline screen.
//!
//! # Responsibility
//! - Expose timeline list/create/edit/delete/favorite intents to Dart via FRB.
//! - Flatten engine results and warnings into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Each call loads, mutates and writes back under one process-wide lock.
//! - Dates cross the boundary as ISO `YYYY-MM-DD` strings.

use log::warn;
use milestone_core::db::open_db;
use milestone_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_date,
    ping as ping_inner, resolve_db_path, Category, CategoryFilter, CorruptDataWarning,
    FilterConfig, Milestone, MilestoneDraft, MilestoneId, MilestoneStore, MilestoneUpdate,
    MutationOutcome, SqliteKvStore, StoreConfig, StoreError,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

static TIMELINE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static TIMELINE_CALL_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Exposes the core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One milestone as rendered by the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    /// Canonical category name (`development|health|nutrition|sleep|other`).
    pub category: String,
    pub favorite: bool,
}

/// Response envelope for timeline list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineListResponse {
    /// Whether the query ran.
    pub ok: bool,
    /// Filtered milestones, newest date first.
    pub items: Vec<TimelineItem>,
    /// Human-readable diagnostics, including load warnings.
    pub message: String,
}

/// Response envelope for timeline mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineActionResponse {
    /// Whether the in-memory operation succeeded.
    pub ok: bool,
    /// Whether the result reached durable storage.
    pub persisted: bool,
    /// Affected milestone on success.
    pub item: Option<TimelineItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TimelineActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            persisted: false,
            item: None,
            message: message.into(),
        }
    }
}

/// Lists milestones for the timeline screen.
///
/// `category` is `None`, `"all"`, or a category name; unknown names are
/// rejected instead of silently widening the filter.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_list(category: Option<String>, favorites_only: bool) -> TimelineListResponse {
    let category = match category.as_deref().map(CategoryFilter::parse) {
        None => CategoryFilter::All,
        Some(Some(filter)) => filter,
        Some(None) => {
            return TimelineListResponse {
                ok: false,
                items: Vec::new(),
                message: format!(
                    "timeline_list failed: unknown category `{}`",
                    category.unwrap_or_default()
                ),
            };
        }
    };
    let filter = FilterConfig {
        category,
        favorites_only,
    };

    match with_store(|store, load_note| {
        let items = store
            .query(&filter)
            .iter()
            .map(to_timeline_item)
            .collect::<Vec<_>>();
        let mut message = if items.is_empty() {
            "No milestones.".to_string()
        } else {
            format!("Found {} milestone(s).", items.len())
        };
        append_note(&mut message, load_note);
        TimelineListResponse {
            ok: true,
            items,
            message,
        }
    }) {
        Ok(response) => response,
        Err(err) => TimelineListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("timeline_list failed: {err}"),
        },
    }
}

/// Creates a milestone from the timeline form.
///
/// # FFI contract
/// - `date` must be ISO `YYYY-MM-DD`; `category` must be a known name.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_create(
    title: String,
    description: String,
    date: String,
    category: String,
) -> TimelineActionResponse {
    let draft = match parse_draft(title, description, &date, &category) {
        Ok(draft) => draft,
        Err(message) => {
            return TimelineActionResponse::failure(format!("timeline_create failed: {message}"));
        }
    };
    run_mutation("timeline_create", "Milestone created.", |store| store.create(draft))
}

/// Replaces title, description, date and category of a milestone.
///
/// The favorite flag is preserved.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_update(
    id: String,
    title: String,
    description: String,
    date: String,
    category: String,
) -> TimelineActionResponse {
    let Some(id) = MilestoneId::parse(id) else {
        return TimelineActionResponse::failure("timeline_update failed: id cannot be empty");
    };
    let draft = match parse_draft(title, description, &date, &category) {
        Ok(draft) => draft,
        Err(message) => {
            return TimelineActionResponse::failure(format!("timeline_update failed: {message}"));
        }
    };
    run_mutation("timeline_update", "Milestone updated.", |store| {
        store.update(&id, MilestoneUpdate::from(draft))
    })
}

/// Deletes a milestone permanently.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_delete(id: String) -> TimelineActionResponse {
    let Some(id) = MilestoneId::parse(id) else {
        return TimelineActionResponse::failure("timeline_delete failed: id cannot be empty");
    };
    run_mutation("timeline_delete", "Milestone deleted.", |store| store.delete(&id))
}

/// Flips the favorite flag of a milestone.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_toggle_favorite(id: String) -> TimelineActionResponse {
    let Some(id) = MilestoneId::parse(id) else {
        return TimelineActionResponse::failure(
            "timeline_toggle_favorite failed: id cannot be empty",
        );
    };
    run_mutation("timeline_toggle_favorite", "Favorite updated.", |store| {
        store.toggle_favorite(&id)
    })
}

type TimelineStore<'conn> = MilestoneStore<SqliteKvStore<'conn>>;

fn run_mutation(
    operation: &str,
    success_message: &str,
    mutate: impl FnOnce(&mut TimelineStore<'_>) -> Result<MutationOutcome<Milestone>, StoreError>,
) -> TimelineActionResponse {
    let result = with_store(|store, load_note| {
        if store.is_read_only() {
            let reason = load_note.map(ToString::to_string).unwrap_or_default();
            warn!("event={operation} module=ffi status=error reason=storage_unreadable");
            return TimelineActionResponse::failure(format!(
                "{operation} failed: stored milestones could not be read ({reason}); try again"
            ));
        }
        match mutate(store) {
            Ok(outcome) => {
                let mut message = success_message.to_string();
                let persisted = outcome.is_persisted();
                if let Some(warning) = &outcome.warning {
                    warn!("event={operation} module=ffi status=warn error={warning}");
                    message.push_str(&format!(" Not saved: {warning}"));
                }
                append_note(&mut message, load_note);
                TimelineActionResponse {
                    ok: true,
                    persisted,
                    item: Some(to_timeline_item(&outcome.value)),
                    message,
                }
            }
            Err(err) => TimelineActionResponse::failure(format!("{operation} failed: {err}")),
        }
    });

    result.unwrap_or_else(|err| {
        TimelineActionResponse::failure(format!("{operation} failed: {err}"))
    })
}

fn with_store<T>(
    f: impl FnOnce(&mut TimelineStore<'_>, Option<&CorruptDataWarning>) -> T,
) -> Result<T, String> {
    // A panic while holding the lock cannot leave the store half-written;
    // the next call reloads from storage.
    let _guard = TIMELINE_CALL_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let conn = open_db(resolve_timeline_db_path())
        .map_err(|err| format!("timeline DB open failed: {err}"))?;
    let kv = SqliteKvStore::try_new(&conn)
        .map_err(|err| format!("timeline storage init failed: {err}"))?;
    let (mut store, load_warning) = MilestoneStore::open(kv, StoreConfig::default());
    Ok(f(&mut store, load_warning.as_ref()))
}

fn resolve_timeline_db_path() -> PathBuf {
    TIMELINE_DB_PATH.get_or_init(resolve_db_path).clone()
}

fn parse_draft(
    title: String,
    description: String,
    date: &str,
    category: &str,
) -> Result<MilestoneDraft, String> {
    let date =
        parse_date(date).ok_or_else(|| format!("invalid date `{date}`; expected YYYY-MM-DD"))?;
    let category =
        Category::parse(category).ok_or_else(|| format!("unknown category `{category}`"))?;
    Ok(MilestoneDraft::new(title, date, category).description(description))
}

fn append_note(message: &mut String, load_note: Option<&CorruptDataWarning>) {
    if let Some(warning) = load_note {
        message.push_str(&format!(" Started from an empty timeline: {warning}"));
    }
}

fn to_timeline_item(milestone: &Milestone) -> TimelineItem {
    TimelineItem {
        id: milestone.id.to_string(),
        title: milestone.title.clone(),
        description: milestone.description.clone(),
        date: milestone.date.format("%Y-%m-%d").to_string(),
        category: milestone.category.as_str().to_string(),
        favorite: milestone.favorite,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, timeline_create, timeline_delete, timeline_list,
        timeline_toggle_favorite, timeline_update,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn create_then_list_returns_item() {
        let title = unique_token("create-list");
        let created = timeline_create(
            title.clone(),
            "first try".to_string(),
            "2024-01-15".to_string(),
            "development".to_string(),
        );
        assert!(created.ok, "{}", created.message);
        assert!(created.persisted, "{}", created.message);
        let item = created.item.expect("create should return the item");
        assert_eq!(item.title, title);
        assert_eq!(item.date, "2024-01-15");
        assert_eq!(item.category, "development");
        assert!(!item.favorite);

        let listed = timeline_list(Some("development".to_string()), false);
        assert!(listed.ok, "{}", listed.message);
        assert!(listed.items.iter().any(|entry| entry.id == item.id));
        assert!(listed
            .items
            .iter()
            .all(|entry| entry.category == "development"));
    }

    #[test]
    fn toggle_favorite_and_favorites_filter() {
        let created = timeline_create(
            unique_token("favorite"),
            String::new(),
            "2024-02-20".to_string(),
            "nutrition".to_string(),
        );
        let id = created.item.expect("created item").id;

        let toggled = timeline_toggle_favorite(id.clone());
        assert!(toggled.ok, "{}", toggled.message);
        assert!(toggled.item.as_ref().is_some_and(|item| item.favorite));

        let favorites = timeline_list(None, true);
        assert!(favorites.items.iter().any(|entry| entry.id == id));
        assert!(favorites.items.iter().all(|entry| entry.favorite));

        let untoggled = timeline_toggle_favorite(id);
        assert!(untoggled.item.is_some_and(|item| !item.favorite));
    }

    #[test]
    fn update_keeps_favorite_and_replaces_fields() {
        let created = timeline_create(
            unique_token("update"),
            String::new(),
            "2024-03-01".to_string(),
            "sleep".to_string(),
        );
        let id = created.item.expect("created item").id;
        timeline_toggle_favorite(id.clone());

        let updated = timeline_update(
            id.clone(),
            "Slept 8 hours".to_string(),
            "whole night".to_string(),
            "2024-03-02".to_string(),
            "health".to_string(),
        );
        assert!(updated.ok, "{}", updated.message);
        let item = updated.item.expect("updated item");
        assert_eq!(item.id, id);
        assert_eq!(item.title, "Slept 8 hours");
        assert_eq!(item.category, "health");
        assert!(item.favorite);
    }

    #[test]
    fn delete_twice_reports_not_found() {
        let created = timeline_create(
            unique_token("delete"),
            String::new(),
            "2024-04-01".to_string(),
            "other".to_string(),
        );
        let id = created.item.expect("created item").id;

        let first = timeline_delete(id.clone());
        assert!(first.ok, "{}", first.message);

        let second = timeline_delete(id.clone());
        assert!(!second.ok);
        assert!(second.message.contains("not found"));

        let listed = timeline_list(None, false);
        assert!(listed.items.iter().all(|entry| entry.id != id));
    }

    #[test]
    fn invalid_inputs_are_rejected_without_panicking() {
        let bad_date = timeline_create(
            "title".to_string(),
            String::new(),
            "15/01/2024".to_string(),
            "health".to_string(),
        );
        assert!(!bad_date.ok);
        assert!(bad_date.message.contains("invalid date"));

        let bad_category = timeline_create(
            "title".to_string(),
            String::new(),
            "2024-01-15".to_string(),
            "teething".to_string(),
        );
        assert!(!bad_category.ok);
        assert!(bad_category.message.contains("unknown category"));

        let blank_title = timeline_create(
            "   ".to_string(),
            String::new(),
            "2024-01-15".to_string(),
            "health".to_string(),
        );
        assert!(!blank_title.ok);
        assert!(blank_title.message.contains("title"));

        let blank_id = timeline_delete(String::new());
        assert!(!blank_id.ok);

        let bad_filter = timeline_list(Some("teething".to_string()), false);
        assert!(!bad_filter.ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
