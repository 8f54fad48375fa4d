use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Personal task board backed by per-user local files.
/// Storage defaults to ~/.taskflow or a directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "taskflow", version, about = "Personal task board for the terminal")]
pub struct Cli {
    /// Directory holding the active username and every user's task list.
    #[arg(long, global = true, env = "TASKFLOW_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log filter written to <data-dir>/taskflow.log (RUST_LOG takes precedence).
    #[arg(long, global = true, env = "TASKFLOW_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}
