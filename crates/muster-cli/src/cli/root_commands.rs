use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use muster_core::enums::SignAction;

use crate::cli::subcommands::SettingsCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Replace the roster from staff, client, and schedule CSV files.
    Load(LoadArgs),
    /// Record a sign-in or sign-out.
    Sign(SignArgs),
    /// Who is on site right now: present and missing lists.
    Status(DayArgs),
    /// Per-shift attendance for a day.
    Schedule(ScheduleArgs),
    /// Most recent sign events, newest first, or one day's sign-in sheet.
    Recent(RecentArgs),
    /// Run a fire drill and export the accountability report.
    Drill(DrillArgs),
    /// Send the roll call to the configured channel.
    Notify(NotifyArgs),
    /// Show or change runtime settings.
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// Copy the event snapshot into the archive and prune old copies.
    Archive,
    /// Log state and flush health.
    Health,
    /// Recover from a corrupt event snapshot.
    Recover(RecoverArgs),
}

#[derive(Clone, Debug, Args)]
pub struct LoadArgs {
    /// Staff CSV (id,name,site + optional email,phone,contact_name,contact_phone)
    #[arg(long)]
    pub staff: PathBuf,

    /// Client CSV (same columns as staff)
    #[arg(long)]
    pub clients: PathBuf,

    /// Schedule CSV (person_type,id,date,start_time,end_time,site)
    #[arg(long)]
    pub schedule: PathBuf,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Direction {
    In,
    Out,
}

impl From<Direction> for SignAction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::In => Self::SignIn,
            Direction::Out => Self::SignOut,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct SignArgs {
    /// in or out
    pub direction: Direction,

    /// Person key, e.g. staff:STF001
    pub person: String,

    /// Site of the event (defaults to the person's home site)
    #[arg(long)]
    pub site: Option<String>,

    /// Event time: RFC 3339, or YYYY-MM-DDTHH:MM in the configured offset
    #[arg(long)]
    pub at: Option<String>,

    /// Who recorded the event
    #[arg(long)]
    pub by: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct DayArgs {
    /// Day to reconcile (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Restrict to one site
    #[arg(long)]
    pub site: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ScheduleArgs {
    /// Day to show (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct RecentArgs {
    /// Number of events to show
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,

    /// Show every event of this day in order instead (YYYY-MM-DD)
    #[arg(long, conflicts_with = "limit")]
    pub date: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct DrillArgs {
    #[command(flatten)]
    pub day: DayArgs,

    /// Where the drill took place
    #[arg(long)]
    pub location: String,

    /// Drill date/time (YYYY-MM-DDTHH:MM, defaults to now)
    #[arg(long)]
    pub at: Option<String>,

    /// Mark a person accounted for (repeatable)
    #[arg(long)]
    pub present: Vec<String>,

    /// Mark a person not accounted for, optionally with KEY=REASON (repeatable)
    #[arg(long)]
    pub absent: Vec<String>,

    /// Refuse to export while an absence has no reason
    #[arg(long)]
    pub require_reasons: bool,

    /// Directory for the CSV report (defaults to <runtime-dir>/reports)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct NotifyArgs {
    #[command(flatten)]
    pub day: DayArgs,

    /// Override the saved timeout, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Clone, Debug, Args)]
#[group(required = true, multiple = false)]
pub struct RecoverArgs {
    /// Quarantine a corrupt snapshot and start an empty log
    #[arg(long)]
    pub clean_slate: bool,

    /// Replace the live snapshot with this archived copy
    #[arg(long)]
    pub from_archive: Option<PathBuf>,

    /// Replace the live snapshot with the newest archived copy
    #[arg(long)]
    pub latest_archive: bool,
}
