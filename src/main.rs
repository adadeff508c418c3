use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Config, DATA_DIR_ENV},
    models::{
        activity::{ActivityDraft, ActivityPatch, ActivityType, Priority},
        view::{SortKey, StatusFilter},
    },
    services::{
        activities::ActivityError,
        ids::{IdGenerator, UuidGenerator},
        session::{Command, Outcome, Session, SessionError},
        theme::Theme,
    },
    storage::{KeyValueStore, json::JsonFileStorage, memory::MemoryStorage},
};

mod config;
mod models;
mod services;
mod storage;
mod ui;

#[derive(Parser)]
#[command(
    name = "studylog",
    about = "Track study activities from your terminal"
)]
struct Cli {
    /// Directory where activities and preferences are stored
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory for this run, nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Log store and storage activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List activities (default)
    List {
        /// Which activities to show
        #[arg(short, long, value_enum, default_value_t = StatusFilter::All)]
        filter: StatusFilter,

        /// Case-insensitive text to look for in title or subject
        #[arg(short, long, default_value = "")]
        search: String,

        /// Order by title, priority or deadline (anything else keeps insertion order)
        #[arg(long, default_value = "none")]
        sort: String,
    },

    /// Add a new activity
    Add {
        /// Activity title
        title: String,

        /// Priority: high, medium or low
        #[arg(short, long)]
        priority: Priority,

        /// Subject or course
        #[arg(short, long, default_value = "")]
        subject: String,

        /// Type: reading, practice, project or evaluation
        #[arg(short = 't', long = "type", default_value = "reading")]
        kind: ActivityType,

        /// Free-form difficulty label
        #[arg(long, default_value = "")]
        difficulty: String,

        /// Estimated time in hours
        #[arg(long, allow_negative_numbers = true)]
        time: Option<f64>,

        /// Deadline (YYYY-MM-DD)
        #[arg(short, long, default_value = "", value_parser = parse_deadline)]
        deadline: String,

        /// Notes
        #[arg(short, long, default_value = "")]
        notes: String,

        /// Mark as important
        #[arg(short, long)]
        important: bool,
    },

    /// Mark an activity as completed, or pending again
    Toggle {
        /// Activity id or a unique prefix of it
        id: String,
    },

    /// Edit title, subject, type or deadline of an activity
    Edit {
        /// Activity id or a unique prefix of it
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        subject: Option<String>,

        #[arg(short = 't', long = "type")]
        kind: Option<ActivityType>,

        /// New deadline (YYYY-MM-DD), empty to clear it
        #[arg(short, long, value_parser = parse_deadline)]
        deadline: Option<String>,
    },

    /// Delete an activity
    Remove {
        /// Activity id or a unique prefix of it
        id: String,
    },

    /// Show totals over all activities
    Stats,

    /// Show or change the display theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCommands>,
    },
}

#[derive(Debug, Subcommand)]
enum ThemeCommands {
    /// Switch between light and dark
    Toggle,
    /// Use the light theme
    Light,
    /// Use the dark theme
    Dark,
}

/// Deadlines are either empty or a calendar date.
fn parse_deadline(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    trimmed
        .parse::<jiff::civil::Date>()
        .map(|date| date.to_string())
        .map_err(|e| format!("invalid date '{}': {}", trimmed, e))
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::resolve(cli.data_dir.clone(), cli.verbose);
    init_logging(&config);

    let command = cli.command.unwrap_or(Commands::List {
        filter: StatusFilter::All,
        search: String::new(),
        sort: String::from("none"),
    });

    if cli.ephemeral {
        debug!("running with in-memory storage");
        let mut session = Session::open(MemoryStorage::new(), UuidGenerator);
        run(&mut session, command);
        return;
    }

    // Create data directory if it doesn't exist
    std::fs::create_dir_all(&config.data_dir).unwrap_or_else(|e| {
        ui::render_error(&format!(
            "Failed to create data directory '{}': {}",
            config.data_dir.display(),
            e
        ));
        std::process::exit(1);
    });
    debug!(data_dir = %config.data_dir.display(), "using data directory");

    let mut session = Session::open(JsonFileStorage::new(config.data_dir), UuidGenerator);
    run(&mut session, command);
}

fn run<S: KeyValueStore, G: IdGenerator>(session: &mut Session<S, G>, command: Commands) {
    match command {
        Commands::List {
            filter,
            search,
            sort,
        } => {
            dispatch(session, Command::SetStatusFilter(filter));
            dispatch(session, Command::SetSearchQuery(search));
            dispatch(session, Command::SetSortKey(SortKey::parse_lenient(&sort)));

            let today = jiff::Zoned::now().date();
            let visible = session.visible();
            if visible.is_empty() {
                ui::render_empty_state();
            } else {
                ui::render_view_header(session.view(), visible.len(), session.theme());
                for activity in visible {
                    ui::render_activity_line(activity, today);
                }
                println!();
            }
        }
        Commands::Add {
            title,
            priority,
            subject,
            kind,
            difficulty,
            time,
            deadline,
            notes,
            important,
        } => {
            let draft = ActivityDraft {
                title,
                subject,
                kind,
                difficulty,
                estimated_time: time,
                priority,
                deadline,
                notes,
                important,
            };
            if let Outcome::Added(activity) = dispatch(session, Command::Add(draft)) {
                ui::render_success(&format!(
                    "Added '{}' ({})",
                    activity.title,
                    ui::short_id(&activity)
                ));
            }
        }
        Commands::Toggle { id } => {
            let id = resolve(session, &id);
            if let Outcome::Toggled(activity) = dispatch(session, Command::ToggleCompleted(id)) {
                let state = if activity.completed {
                    "completed"
                } else {
                    "pending"
                };
                ui::render_success(&format!("'{}' is now {}", activity.title, state));
            }
        }
        Commands::Edit {
            id,
            title,
            subject,
            kind,
            deadline,
        } => {
            let id = resolve(session, &id);
            let Some(current) = session.get(id) else {
                ui::render_error("Activity not found");
                std::process::exit(1);
            };

            let mut patch = ActivityPatch::from_activity(current);
            if let Some(title) = title {
                patch.title = title;
            }
            if let Some(subject) = subject {
                patch.subject = subject;
            }
            if let Some(kind) = kind {
                patch.kind = kind;
            }
            if let Some(deadline) = deadline {
                patch.deadline = deadline;
            }

            if let Outcome::Updated(activity) = dispatch(session, Command::Update(id, patch)) {
                ui::render_success(&format!("Updated '{}'", activity.title));
            }
        }
        Commands::Remove { id } => {
            let id = resolve(session, &id);
            match dispatch(session, Command::Remove(id)) {
                Outcome::Removed(Some(activity)) => {
                    ui::render_success(&format!("Removed '{}'", activity.title));
                }
                _ => ui::render_warning("Nothing to remove"),
            }
        }
        Commands::Stats => {
            ui::render_stats(&session.stats(), session.theme());
        }
        Commands::Theme { action } => {
            let command = match action {
                None => {
                    println!("{}", session.theme());
                    return;
                }
                Some(ThemeCommands::Toggle) => Command::ToggleTheme,
                Some(ThemeCommands::Light) => Command::SetTheme(Theme::Light),
                Some(ThemeCommands::Dark) => Command::SetTheme(Theme::Dark),
            };
            if let Outcome::ThemeChanged(theme) = dispatch(session, command) {
                ui::render_success(&format!("Theme set to {}", theme));
            }
        }
    }
}

fn resolve<S: KeyValueStore, G: IdGenerator>(session: &Session<S, G>, input: &str) -> uuid::Uuid {
    session.resolve_id(input).unwrap_or_else(|e| {
        ui::render_error(&e.to_string());
        std::process::exit(1);
    })
}

/// Runs a command, reporting failures and exiting with status 1.
fn dispatch<S: KeyValueStore, G: IdGenerator>(
    session: &mut Session<S, G>,
    command: Command,
) -> Outcome {
    match session.dispatch(command) {
        Ok(outcome) => outcome,
        Err(SessionError::Activity(ActivityError::Validation(e))) => {
            ui::render_error(&format!("{}, nothing was changed", e));
            std::process::exit(1);
        }
        Err(SessionError::Unsaved { outcome, source }) => {
            // Memory is still authoritative, give the write one more chance
            if session.has_unsaved_changes() && session.flush().is_ok() {
                ui::render_warning(&format!("first save attempt failed ({}), retried", source));
                return outcome;
            }
            ui::render_error(&format!("Changes could not be saved: {}", source));
            std::process::exit(1);
        }
        Err(e) => {
            ui::render_error(&e.to_string());
            std::process::exit(1);
        }
    }
}
