use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "camctl", version, about = "Surveillance server API client")]
pub struct Cli {
    /// Path to the client config JSON (defaults to the camctl state dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List monitors with their function, state and zone count.
    Monitors(MonitorsArgs),
    /// Read monitor or zone parameters.
    Get(GetArgs),
    /// Write monitor or zone parameters as Name:Value pairs.
    Set(SetArgs),
    /// Query recorded events over a time window.
    Events(EventsArgs),
    /// Download event videos and optionally concatenate them.
    Export(ExportArgs),
}

#[derive(Args)]
pub struct MonitorsArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct GetArgs {
    /// Monitor id or name.
    pub monitor: String,
    /// Parameter names, or a zone key followed by zone parameter names.
    #[arg(required = true)]
    pub tokens: Vec<String>,
}

#[derive(Args)]
pub struct SetArgs {
    /// Monitor id or name.
    pub monitor: String,
    /// Name:Value pairs, or a zone key followed by Name:Value pairs.
    #[arg(required = true)]
    pub tokens: Vec<String>,
}

#[derive(Args)]
pub struct EventsArgs {
    /// Start of the time window, e.g. "2021-01-01" or "2 days ago".
    #[arg(long)]
    pub from: String,
    /// End of the time window (defaults to now).
    #[arg(long)]
    pub to: Option<String>,
    /// Monitor id or name to include; prefix with '!' to exclude instead.
    #[arg(long = "monitor")]
    pub monitors: Vec<String>,
    /// Server-side notes filter (regex); prefix with '!' to negate.
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Start of the time window, e.g. "2021-01-01" or "2 days ago".
    #[arg(long)]
    pub from: String,
    /// End of the time window (defaults to now).
    #[arg(long)]
    pub to: Option<String>,
    /// Monitor id or name to include; prefix with '!' to exclude instead.
    #[arg(long = "monitor")]
    pub monitors: Vec<String>,
    /// Server-side notes filter (regex); prefix with '!' to negate.
    #[arg(long)]
    pub notes: Option<String>,
    /// Staging directory for downloaded videos (defaults to the configured
    /// export root).
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Concatenate the staged videos into this file with ffmpeg.
    #[arg(long)]
    pub concat: Option<PathBuf>,
}
