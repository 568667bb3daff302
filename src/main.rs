//! liftcycle - Personal workout tracker
//!
//! Routines rotate day by day; `train` walks through today's one.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::Level;

use liftcycle::clock::{Clock, SystemClock, format_date, parse_date, weekday_index};
use liftcycle::editor::{self, RoutineBook, RoutineDraft};
use liftcycle::history::{entries_on, trained_days};
use liftcycle::rotation::todays_routine;
use liftcycle::session::SessionEngine;
use liftcycle::tui::App;
use liftcycle::{Database, Storage};

const DEFAULT_DB_PATH: &str = "liftcycle.db";

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Parser)]
#[command(name = "liftcycle")]
#[command(author, version, about = "Personal workout tracker with routine rotation")]
struct Cli {
    /// Database file
    #[arg(long, global = true, env = "LIFTCYCLE_DB", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's routine
    Today,

    /// Train today's routine in the terminal
    Train,

    /// List routines (rotation pool marked with *)
    Routines,

    /// Add or remove routines
    Routine {
        #[command(subcommand)]
        action: RoutineAction,
    },

    /// List training history
    History {
        /// Only this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Trained days of a month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show or change profile and rotation settings
    Config {
        /// Rotation pool size
        #[arg(short, long)]
        pool: Option<String>,

        /// Your name
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum RoutineAction {
    /// Validate and save a routine draft (JSON); an existing id is replaced
    Add {
        file: PathBuf,
    },

    /// Delete a routine by id
    Delete {
        id: String,
    },
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let db = Database::open(&cli.db)
        .with_context(|| format!("Failed to open database {}", cli.db.display()))?;
    let mut storage = Storage::new(db);
    let clock = SystemClock;

    match cli.command.unwrap_or(Commands::Today) {
        Commands::Today => {
            let routines = storage.routines()?;
            let config = storage.config()?;
            let history = storage.history()?;
            let today = clock.today();

            if let Some(profile) = storage.profile()? {
                println!("Hi, {} 💪", profile.name);
            }
            println!("{} ({})", format_date(today), WEEKDAYS[weekday_index(today) as usize]);

            match todays_routine(today, &routines, config.active_routine_count, &history) {
                Some((index, routine)) => {
                    println!("Today's routine: {} [{}]", routine.name, index + 1);
                    println!("{:-<40}", "");
                    for (i, ex) in routine.exercises.iter().enumerate() {
                        println!("{:>2}. {:24} {}", i + 1, ex.name, ex.summary());
                    }
                }
                None => println!("No routines yet. Add one with `liftcycle routine add <file>`."),
            }
        }

        Commands::Train => {
            let routines = storage.routines()?;
            let config = storage.config()?;
            let history = storage.history()?;

            let Some((index, routine)) =
                todays_routine(clock.today(), &routines, config.active_routine_count, &history)
            else {
                println!("No routines yet. Add one with `liftcycle routine add <file>`.");
                return Ok(());
            };
            let routine_id = routine.id.clone();

            let engine = SessionEngine::open(storage, clock, &routine_id, index)?;
            let mut app = App::new(engine);
            app.run()?;
        }

        Commands::Routines => {
            let routines = storage.routines()?;
            let pool = storage.config()?.active_routine_count.max(0) as usize;
            println!("Routines (rotation pool: {}):", pool.min(routines.len()));
            println!("{:-<60}", "");
            for (i, r) in routines.iter().enumerate() {
                let marker = if i < pool { "*" } else { " " };
                println!("{} {:24} | {} exercises | {}", marker, r.name, r.exercises.len(), r.id);
            }
        }

        Commands::Routine { action } => match action {
            RoutineAction::Add { file } => {
                let json = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let draft: RoutineDraft = serde_json::from_str(&json)
                    .with_context(|| format!("Invalid draft in {}", file.display()))?;
                match RoutineBook::new(&mut storage).save(&draft)? {
                    Ok(routine) => println!("Saved: {} (id: {})", routine.name, routine.id),
                    Err(e) => bail!("{}", e),
                }
            }
            RoutineAction::Delete { id } => {
                if RoutineBook::new(&mut storage).delete(&id)? {
                    println!("Deleted {}", id);
                } else {
                    bail!("No routine with id {}", id);
                }
            }
        },

        Commands::History { date, month, limit } => {
            let history = storage.history()?;

            if let Some(month) = month {
                let first = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
                    .with_context(|| format!("Invalid month {}, expected YYYY-MM", month))?;
                let days = trained_days(&history, first.year(), first.month());
                println!("Trained days in {}: {}", month, days.len());
                for day in days {
                    let names: Vec<&str> = entries_on(&history, day)
                        .iter()
                        .map(|e| e.routine_name.as_str())
                        .collect();
                    println!("{} {} | {}", format_date(day), WEEKDAYS[weekday_index(day) as usize], names.join(", "));
                }
            } else if let Some(date) = date {
                let Some(day) = parse_date(&date) else {
                    bail!("Invalid date {}, expected YYYY-MM-DD", date);
                };
                for e in entries_on(&history, day) {
                    println!("{} | {} (slot {})", format_date(e.date), e.routine_name, e.routine_index + 1);
                }
            } else {
                println!("Recent workouts:");
                println!("{:-<50}", "");
                for e in history.iter().rev().take(limit) {
                    println!("{} | {:24} | slot {}", format_date(e.date), e.routine_name, e.routine_index + 1);
                }
            }
        }

        Commands::Config { pool, name } => {
            if let Some(name) = name
                && let Err(e) = editor::save_profile(&mut storage, &name)?
            {
                bail!("{}", e);
            }
            if let Some(pool) = pool
                && let Err(e) = editor::save_config(&mut storage, &pool)?
            {
                bail!("{}", e);
            }

            let profile = storage.profile()?;
            let config = storage.config()?;
            println!("Name: {}", profile.map(|p| p.name).unwrap_or_else(|| "-".to_string()));
            println!("Active routines: {}", config.active_routine_count);
        }
    }

    Ok(())
}
