//! # weekboard
//!
//! A terminal kanban board for the week. Tasks sit in a backlog, on a day of
//! the week, or in the completed column.
//!
//! ## Usage
//!
//! ```bash
//! # Add a task to backlog, or straight onto a day of this week
//! weekboard add "Clean gutters" --priority high
//! weekboard add "Water plants" --day wednesday
//!
//! # Show this week's board (rolls stale tasks back to backlog first)
//! weekboard board
//! weekboard board --next
//!
//! # Move tasks around
//! weekboard schedule <ID> friday --next
//! weekboard complete <ID>
//! weekboard reopen <ID> --day saturday
//!
//! # Recurring templates
//! weekboard recurring add "Take out bins" --day monday
//! weekboard recurring generate
//!
//! # Weekly review
//! weekboard commit 3 5 8 --theme "Garden week"
//! weekboard review summary
//! weekboard review mark --note "Good week"
//! ```
//!
//! ## Configuration
//!
//! `~/.config/weekboard/config.toml` (or `WEEKBOARD_CONFIG`):
//!
//! ```toml
//! first_day_of_week = "sunday"
//! utc_offset = "-05:00"
//! ```
//!
//! The board is stored in `~/.local/share/weekboard/board.json` unless
//! `WEEKBOARD_DB` or `database` in the config points elsewhere.

use std::io::{self, Write};

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use weekboard::commands::*;
use weekboard::config::Config;
use weekboard::models::{Frequency, Priority, TaskId};
use weekboard::storage::Store;
use weekboard::week::{DayOfWeek, WeekKey};

#[derive(Parser)]
#[command(name = "weekboard")]
#[command(about = "Weekly kanban board for household tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Week selection shared by several commands.
#[derive(clap::Args, Clone, Copy)]
struct WeekArgs {
    /// Use next week instead of the current one
    #[arg(long, conflicts_with = "week")]
    next: bool,
    /// Use the week starting on this date (YYYY-MM-DD)
    #[arg(long)]
    week: Option<WeekKey>,
}

impl WeekArgs {
    fn choice(&self) -> WeekChoice {
        match (self.next, self.week) {
            (_, Some(key)) => WeekChoice::Key(key),
            (true, None) => WeekChoice::Next,
            (false, None) => WeekChoice::Current,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        /// Put the task on this day of the current week instead of backlog
        #[arg(long)]
        day: Option<DayOfWeek>,
    },
    /// Show the board for a week
    Board {
        #[command(flatten)]
        week: WeekArgs,
    },
    /// Schedule a task on a day
    Schedule {
        id: TaskId,
        day: DayOfWeek,
        #[command(flatten)]
        week: WeekArgs,
    },
    /// Move a task back to backlog
    Unschedule { id: TaskId },
    /// Mark a task as complete
    Complete { id: TaskId },
    /// Reopen a completed task
    Reopen {
        id: TaskId,
        /// Day of the current week to put it on (backlog when omitted)
        #[arg(long)]
        day: Option<DayOfWeek>,
    },
    /// Edit a task
    Edit {
        id: TaskId,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// Remove a task
    Remove { id: TaskId },
    /// Return stale tasks to backlog and archive past weeks
    Rollover,
    /// Show the completion streak
    Streak,
    /// Manage recurring tasks
    Recurring {
        #[command(subcommand)]
        command: RecurringCommands,
    },
    /// Set the commitments for a week
    Commit {
        /// Task ids to commit to
        #[arg(required = true)]
        ids: Vec<TaskId>,
        /// Theme for the week
        #[arg(long)]
        theme: Option<String>,
        #[command(flatten)]
        week: WeekArgs,
    },
    /// Weekly review
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },
    /// Print today's tasks, streak and commitments as JSON
    Digest,
    /// Show archived weeks
    History {
        /// Show only the week starting on this date (YYYY-MM-DD)
        #[arg(long)]
        week: Option<WeekKey>,
    },
    /// Reset the database (delete all tasks, templates and weeks)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum RecurringCommands {
    /// Add a recurring task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        /// weekly or monthly
        #[arg(short, long, default_value = "weekly")]
        frequency: Frequency,
        /// Day the generated task is scheduled on (backlog when omitted)
        #[arg(long)]
        day: Option<DayOfWeek>,
    },
    /// List recurring tasks
    List,
    /// Pause or resume a recurring task
    Toggle { id: u64 },
    /// Remove a recurring task
    Remove { id: u64 },
    /// Generate this week's tasks from active recurring tasks
    Generate,
}

#[derive(Subcommand)]
enum ReviewCommands {
    /// Summarise a week
    Summary {
        #[command(flatten)]
        week: WeekArgs,
    },
    /// Mark the current week as reviewed
    Mark {
        /// Reflection to keep with the week
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Mark the backlog as reviewed for the current week
    Backlog,
    /// Show which reviews are due
    Status,
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config);

    let policy = config.policy()?;
    let ctx = Context::new(Store::new(config.database_path()), policy, Utc::now());

    match cli.command {
        Some(Commands::Add { title, description, priority, day }) => {
            cmd_add(&ctx, title, description, priority, day, false)?;
        }
        Some(Commands::Board { week }) => cmd_board(&ctx, week.choice(), false)?,
        Some(Commands::Schedule { id, day, week }) => cmd_schedule(&ctx, id, day, week.choice(), false)?,
        Some(Commands::Unschedule { id }) => cmd_unschedule(&ctx, id, false)?,
        Some(Commands::Complete { id }) => cmd_complete(&ctx, id, false)?,
        Some(Commands::Reopen { id, day }) => cmd_reopen(&ctx, id, day, false)?,
        Some(Commands::Edit { id, title, description, priority }) => {
            cmd_edit(&ctx, id, title, description, priority, false)?;
        }
        Some(Commands::Remove { id }) => cmd_remove(&ctx, id, false)?,
        Some(Commands::Rollover) => cmd_rollover(&ctx, false)?,
        Some(Commands::Streak) => cmd_streak(&ctx)?,
        Some(Commands::Recurring { command }) => match command {
            RecurringCommands::Add { title, description, priority, frequency, day } => {
                cmd_recurring_add(&ctx, title, description, priority, frequency, day, false)?;
            }
            RecurringCommands::List => cmd_recurring_list(&ctx)?,
            RecurringCommands::Toggle { id } => {
                cmd_recurring_toggle(&ctx, id, false)?;
            }
            RecurringCommands::Remove { id } => cmd_recurring_remove(&ctx, id, false)?,
            RecurringCommands::Generate => {
                cmd_recurring_generate(&ctx, false)?;
            }
        },
        Some(Commands::Commit { ids, theme, week }) => cmd_commit(&ctx, week.choice(), ids, theme, false)?,
        Some(Commands::Review { command }) => match command {
            ReviewCommands::Summary { week } => cmd_review_summary(&ctx, week.choice())?,
            ReviewCommands::Mark { note } => cmd_review_mark(&ctx, note, false)?,
            ReviewCommands::Backlog => cmd_backlog_reviewed(&ctx, false)?,
            ReviewCommands::Status => cmd_review_status(&ctx)?,
        },
        Some(Commands::Digest) => cmd_digest(&ctx)?,
        Some(Commands::History { week }) => {
            cmd_history(&ctx, week, false)?;
        }
        Some(Commands::Reset { force }) => {
            if force || confirm("Are you sure you want to delete all tasks, templates and weeks? This cannot be undone.")? {
                cmd_reset(&ctx, false)?;
            } else {
                println!("Aborted.");
            }
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "weekboard", &mut io::stdout());
        }
        None => cmd_board(&ctx, WeekChoice::Current, false)?,
    }
    Ok(())
}
