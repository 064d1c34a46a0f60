//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mt_core::{ActivityType, HistoryRange, Period};

/// Consuming vs creating time tracker.
///
/// Times sessions of consuming (watching, scrolling, playing) or creating
/// (coding, writing, designing) and reports how the two balance out.
#[derive(Debug, Parser)]
#[command(name = "mt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a new session.
    Start {
        /// Activity type: consuming or creating.
        activity_type: ActivityType,

        /// What the session is about.
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Start a session from a preset, or list presets when no title is given.
    Quick {
        /// Preset title (case-insensitive), e.g. "music" or "code".
        title: Option<String>,
    },

    /// Stop a session (defaults to the running one).
    Stop {
        /// Session ID or unique prefix.
        id: Option<String>,
    },

    /// Flip a session between consuming and creating (defaults to the running one).
    Switch {
        /// Session ID or unique prefix.
        id: Option<String>,
    },

    /// Delete a session permanently.
    Delete {
        /// Session ID or unique prefix.
        id: String,
    },

    /// Show running sessions and today's totals.
    Status,

    /// Show a live running-time line until the session stops or Ctrl-C.
    Watch,

    /// Show totals and balance for a calendar period.
    Report {
        /// Period granularity.
        #[arg(short, long, default_value = "day")]
        period: Period,

        /// Reference date: YYYY-MM-DD, RFC 3339, "today", "yesterday" or "N days ago".
        #[arg(short, long)]
        date: Option<String>,

        /// Number of periods to move from the reference date (negative goes back).
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the month grid with per-day balance.
    Calendar {
        /// Reference date inside the month to show.
        #[arg(short, long)]
        date: Option<String>,

        /// Number of months to move from the reference date.
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,

        /// Period around the reference date to mark as selected.
        #[arg(short, long, default_value = "day")]
        period: Period,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List completed sessions, newest first.
    History {
        /// Date range: today, yesterday, this-week, this-month or all-time.
        #[arg(short, long, default_value = "all-time")]
        range: HistoryRange,

        /// Only show sessions of this activity type.
        #[arg(short = 't', long = "type")]
        activity_type: Option<ActivityType>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
