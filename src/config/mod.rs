pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "kanban-drag")]
#[command(about = "Replay drag-and-drop sessions against a kanban board")]
pub struct CliConfig {
    /// Path to the TOML board/scenario file
    #[arg(short, long, default_value = "board.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Validate and summarize the scenario without replaying it
    #[arg(long)]
    pub dry_run: bool,
}
