//! `campus` CLI: conflict checks, shared free slots, and due reminders over a
//! JSON timetable snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Does a candidate booking collide with anything in a lecturer's calendar?
//! campus check --snapshot campus.json --person faculty:f1 \
//!     --start 2026-03-02T10:30:00Z --end 2026-03-02T11:30:00Z --scenario lecture
//!
//! # Editing a personal event: leave the event itself out of the comparison
//! campus check --snapshot campus.json --person student:s1 \
//!     --start 2026-03-02T13:00:00 --end 2026-03-02T14:00:00 \
//!     --scenario personal-event --exclude p1
//!
//! # One-hour slots free for both a student and a lecturer
//! campus slots --snapshot campus.json --requester student:s1 --target faculty:f1 \
//!     --from 2026-03-02T09:00:00 --to 2026-03-02T17:00:00 --duration 60
//!
//! # Free periods shared by several people
//! campus free --snapshot campus.json --person student:s1 --person faculty:f1 \
//!     --from 2026-03-02T09:00:00 --to 2026-03-02T17:00:00
//!
//! # Reminders due right now
//! campus reminders --snapshot campus.json --now 2026-03-02T09:45:00Z
//! ```
//!
//! Timestamps without an offset are read in the configured institution
//! timezone. Results are printed as JSON on stdout; logs go to stderr.

mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use campus_engine::{
    parse_instant, ConflictChecker, EngineConfig, Interval, MemoryStore, PersonRef, RecordKey,
    ReminderPlanner, Scenario, SlotFinder,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::settings::{load_settings, Settings};

#[derive(Parser)]
#[command(
    name = "campus",
    version,
    about = "Timetable conflict checks and shared availability"
)]
struct Cli {
    /// TOML config file (defaults to ./campus.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a candidate booking against one person's calendar
    Check {
        /// Snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,
        /// Whose calendar, as student:<id> or faculty:<id>
        #[arg(long)]
        person: PersonRef,
        /// Candidate start
        #[arg(long)]
        start: String,
        /// Candidate end
        #[arg(long)]
        end: String,
        /// Record being edited, left out of the comparison: kind:id, or a
        /// bare id of the --scenario kind
        #[arg(long)]
        exclude: Option<String>,
        /// Kind of record being saved; decides which conflict is reported first
        #[arg(long, value_enum, default_value_t = ScenarioArg::Any)]
        scenario: ScenarioArg,
    },
    /// List slots free for both a requester and a target
    Slots {
        /// Snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        requester: PersonRef,
        #[arg(long)]
        target: PersonRef,
        /// Window start
        #[arg(long)]
        from: String,
        /// Window end
        #[arg(long)]
        to: String,
        /// Slot length in minutes (defaults to the configured slot length)
        #[arg(long, allow_negative_numbers = true)]
        duration: Option<i64>,
    },
    /// List free periods shared by everyone given
    Free {
        /// Snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,
        /// Repeat for each person
        #[arg(long = "person", required = true)]
        people: Vec<PersonRef>,
        /// Window start
        #[arg(long)]
        from: String,
        /// Window end
        #[arg(long)]
        to: String,
    },
    /// List lecture and meeting reminders due at a moment
    Reminders {
        /// Snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,
        /// The moment to evaluate
        #[arg(long)]
        now: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScenarioArg {
    Any,
    Lecture,
    PersonalEvent,
    Meeting,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Any => Scenario::Any,
            ScenarioArg::Lecture => Scenario::Lecture,
            ScenarioArg::PersonalEvent => Scenario::PersonalEvent,
            ScenarioArg::Meeting => Scenario::Meeting,
        }
    }
}

#[derive(Serialize)]
struct CheckOutput {
    #[serde(flatten)]
    result: campus_engine::ConflictResult,
    message: &'static str,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&settings);
    tracing::debug!(config = ?settings.engine, "configuration loaded");

    let config = &settings.engine;

    match cli.command {
        Commands::Check {
            snapshot,
            person,
            start,
            end,
            exclude,
            scenario,
        } => {
            let scenario = Scenario::from(scenario);
            let exclude = exclude
                .as_deref()
                .map(|raw| RecordKey::parse_for(raw, scenario))
                .transpose()
                .context("Invalid --exclude")?;
            let store = load_snapshot(&snapshot)?;
            let candidate = Interval::new(instant(&start, config)?, instant(&end, config)?)
                .context("Invalid candidate")?;
            let result = ConflictChecker::new(&store, config)
                .check_scenario(scenario, &person, candidate, exclude.as_ref())
                .context("Conflict check failed")?;
            print_json(&CheckOutput {
                message: scenario.message(result.category),
                result,
            })?;
        }
        Commands::Slots {
            snapshot,
            requester,
            target,
            from,
            to,
            duration,
        } => {
            let store = load_snapshot(&snapshot)?;
            let duration = duration.unwrap_or(config.default_slot_minutes);
            let slots = SlotFinder::new(&store, config)
                .find_available_slots(
                    &requester,
                    &target,
                    duration,
                    instant(&from, config)?,
                    instant(&to, config)?,
                )
                .context("Slot search failed")?;
            print_json(&slots)?;
        }
        Commands::Free {
            snapshot,
            people,
            from,
            to,
        } => {
            let store = load_snapshot(&snapshot)?;
            let free = SlotFinder::new(&store, config)
                .free_periods(&people, instant(&from, config)?, instant(&to, config)?)
                .context("Free period search failed")?;
            print_json(&free)?;
        }
        Commands::Reminders { snapshot, now } => {
            let store = load_snapshot(&snapshot)?;
            let reminders = ReminderPlanner::new(&store, config)
                .due_reminders(instant(&now, config)?)
                .context("Reminder planning failed")?;
            print_json(&reminders)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level; an invalid level falls back to `warn`.
fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_snapshot(path: &Path) -> Result<MemoryStore> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    MemoryStore::from_json(&json)
        .with_context(|| format!("Failed to decode snapshot: {}", path.display()))
}

fn instant(raw: &str, config: &EngineConfig) -> Result<DateTime<Utc>> {
    parse_instant(raw, config).with_context(|| format!("Failed to parse timestamp: {}", raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
