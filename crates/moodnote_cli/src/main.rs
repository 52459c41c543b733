//! MoodNote command line entry point.
//!
//! # Responsibility
//! - Append, list and delete journal notes from the terminal.
//! - Print day and trend reports computed by `moodnote_core`.

use chrono::Local;
use clap::{Parser, Subcommand};
use moodnote_core::db::open_db;
use moodnote_core::{
    default_log_level, init_logging, today_key, Category, DateKey, JournalService,
    KeywordClassifier, ScoreConfig, SqliteNoteRepository, MAX_TREND_DAYS,
};
use std::error::Error;
use std::path::PathBuf;
use uuid::Uuid;

const DEFAULT_DB_FILE: &str = "moodnote.db";
const DEFAULT_TREND_DAYS: u32 = 7;

#[derive(Parser)]
#[command(name = "moodnote", version, about = "Daily well-being scores from journal notes")]
struct Cli {
    /// Journal database file
    #[arg(long, global = true, default_value = DEFAULT_DB_FILE)]
    db: PathBuf,
    /// JSON file with score settings (lambda, scale, ema_alpha)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Absolute directory for rotating log files
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append a note timestamped now
    Add {
        text: String,
        /// Manual category, kept even when the classifier supplies the value
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
        /// Manual value; the classifier is skipped for this note
        #[arg(long, allow_hyphen_values = true)]
        value: Option<f64>,
    },
    /// List all notes, oldest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Delete a note by id
    Delete { id: Uuid },
    /// Show how a text would be classified
    Classify { text: String },
    /// Score a single local day
    Day {
        /// Day as YYYY-MM-DD; defaults to today
        #[arg(long)]
        date: Option<DateKey>,
        #[arg(long)]
        json: bool,
    },
    /// Smoothed trend over the trailing days
    Trend {
        #[arg(
            long,
            default_value_t = DEFAULT_TREND_DAYS,
            value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_TREND_DAYS))
        )]
        days: u32,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir)?;
    }

    let config = match cli.config.as_ref() {
        Some(path) => ScoreConfig::load(path)?,
        None => ScoreConfig::default(),
    };
    let conn = open_db(&cli.db)?;
    let service = JournalService::new(
        SqliteNoteRepository::new(&conn),
        KeywordClassifier::new(),
        config,
    );

    match cli.command {
        Commands::Add {
            text,
            category,
            value,
        } => {
            let note = service.add_note_with_override(text, category, value)?;
            println!("added {}", note.id);
        }
        Commands::List { json } => {
            let notes = service.list_notes()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else {
                for note in notes {
                    let manual = match (note.category, note.value) {
                        (_, None) => String::new(),
                        (category, Some(value)) => format!(
                            " [{} {value:+}]",
                            category.unwrap_or(Category::Other)
                        ),
                    };
                    println!(
                        "{}  {}  {}{manual}",
                        note.id,
                        note.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                        note.text
                    );
                }
            }
        }
        Commands::Delete { id } => {
            service.delete_note(id)?;
            println!("deleted {id}");
        }
        Commands::Classify { text } => {
            let classified = service.classify_text(&text)?;
            println!("{} {:+}", classified.category, classified.value);
        }
        Commands::Day { date, json } => {
            let day = date.unwrap_or_else(|| today_key(&Local));
            let totals = service.day_report(day, &Local)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            } else {
                println!(
                    "{day}  score={:.1}  positive={:.1}  negative={:.1}",
                    totals.raw_score, totals.positive_sum, totals.negative_sum
                );
            }
        }
        Commands::Trend { days, json } => {
            let trend = service.trend_report(today_key(&Local), days, &Local)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&trend)?);
            } else {
                for day in trend {
                    println!(
                        "{}  raw={:>5.1}  trend={:>5.1}  notes={}",
                        day.date_key,
                        day.raw_score,
                        day.smoothed_score,
                        day.entries.len()
                    );
                }
            }
        }
    }
    Ok(())
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| {
        let known: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category `{value}`; expected one of {}", known.join("|"))
    })
}
