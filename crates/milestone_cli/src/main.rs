//! Command-line front end for the milestone timeline.
//!
//! # Responsibility
//! - Map subcommands onto milestone store operations.
//! - Print results for humans (or JSON with `--json`) and warnings to stderr.

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use milestone_core::db::open_db;
use milestone_core::{
    config::DB_PATH_ENV, default_log_level, init_logging, parse_date, resolve_db_path, Category,
    CategoryFilter, FilterConfig, Milestone, MilestoneDraft, MilestoneId, MilestoneStore,
    MilestoneUpdate, MutationOutcome, SqliteKvStore, StoreConfig,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "milestones")]
#[command(about = "Record and browse a baby's milestone timeline", version)]
struct Cli {
    /// SQLite database file (defaults to the system temp directory)
    #[arg(long, global = true, env = DB_PATH_ENV)]
    db: Option<PathBuf>,

    /// Absolute directory for rotating log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level used with --log-dir
    #[arg(long, global = true, requires = "log_dir")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List milestones, newest first
    List {
        /// Category name, or `all`
        #[arg(short, long, default_value = "all", value_parser = parse_category_filter)]
        category: CategoryFilter,

        /// Only show favorites
        #[arg(short, long)]
        favorites: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Record a new milestone
    Add {
        /// What happened
        #[arg(short, long)]
        title: String,

        /// Calendar date, YYYY-MM-DD
        #[arg(short, long, value_parser = parse_date_arg)]
        date: NaiveDate,

        /// Category name
        #[arg(short, long, default_value = "development", value_parser = parse_category_arg)]
        category: Category,

        /// Optional free text
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Edit a milestone; omitted fields keep their current value
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        #[arg(short, long, value_parser = parse_category_arg)]
        category: Option<Category>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a milestone permanently
    Delete { id: String },
    /// Toggle the favorite flag of a milestone
    Favorite { id: String },
    /// Check that the core library is linked
    Ping,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(|err| anyhow!(err))?;
    }

    if let Commands::Ping = cli.command {
        println!("milestone_core ping={}", milestone_core::ping());
        println!("milestone_core version={}", milestone_core::core_version());
        return Ok(());
    }

    let db_path = cli.db.unwrap_or_else(resolve_db_path);
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let kv = SqliteKvStore::try_new(&conn).context("failed to prepare milestone storage")?;
    let (mut store, load_warning) = MilestoneStore::open(kv, StoreConfig::default());
    if let Some(warning) = load_warning {
        eprintln!("warning: {warning}; starting from an empty timeline");
    }
    if store.is_read_only() && !matches!(cli.command, Commands::List { .. }) {
        bail!("stored milestones could not be read; refusing to change them");
    }

    match cli.command {
        Commands::List {
            category,
            favorites,
            json,
        } => {
            let filter = FilterConfig {
                category,
                favorites_only: favorites,
            };
            let milestones = store.query(&filter);
            if json {
                println!("{}", serde_json::to_string_pretty(&milestones)?);
            } else if milestones.is_empty() {
                println!("No milestones.");
            } else {
                for milestone in &milestones {
                    println!("{}", format_row(milestone));
                }
            }
        }
        Commands::Add {
            title,
            date,
            category,
            description,
        } => {
            let draft = MilestoneDraft::new(title, date, category).description(description);
            let outcome = store.create(draft)?;
            report("Added", outcome);
        }
        Commands::Edit {
            id,
            title,
            date,
            category,
            description,
        } => {
            let id = parse_id(id)?;
            let current = store
                .get(&id)
                .ok_or_else(|| anyhow!("milestone not found: {id}"))?;
            let update = MilestoneUpdate {
                title: title.unwrap_or(current.title),
                description: description.unwrap_or(current.description),
                date: date.unwrap_or(current.date),
                category: category.unwrap_or(current.category),
                favorite: None,
            };
            let outcome = store.update(&id, update)?;
            report("Updated", outcome);
        }
        Commands::Delete { id } => {
            let outcome = store.delete(&parse_id(id)?)?;
            report("Deleted", outcome);
        }
        Commands::Favorite { id } => {
            let outcome = store.toggle_favorite(&parse_id(id)?)?;
            report("Toggled favorite", outcome);
        }
        Commands::Ping => {}
    }

    info!(
        "event=cli_command module=cli status=ok count={}",
        store.len()
    );
    Ok(())
}

fn report(action: &str, outcome: MutationOutcome<Milestone>) {
    if let Some(warning) = &outcome.warning {
        eprintln!("warning: {warning}");
    }
    println!("{action}: {}", format_row(&outcome.value));
}

fn format_row(milestone: &Milestone) -> String {
    let star = if milestone.favorite { "*" } else { " " };
    let mut row = format!(
        "{} {} [{:<11}] {}  ({})",
        milestone.date,
        star,
        milestone.category.as_str(),
        milestone.title,
        milestone.id
    );
    if !milestone.description.is_empty() {
        row.push_str(&format!("\n             {}", milestone.description));
    }
    row
}

fn parse_id(raw: String) -> anyhow::Result<MilestoneId> {
    MilestoneId::parse(raw).ok_or_else(|| anyhow!("milestone id cannot be empty"))
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).ok_or_else(|| format!("`{value}` is not a YYYY-MM-DD date"))
}

fn parse_category_arg(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| {
        let known = Category::ALL.map(Category::as_str).join(", ");
        format!("unknown category `{value}`; expected one of: {known}")
    })
}

fn parse_category_filter(value: &str) -> Result<CategoryFilter, String> {
    CategoryFilter::parse(value).ok_or_else(|| format!("unknown category filter `{value}`"))
}
