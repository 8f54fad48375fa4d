//! # taskflow - Personal Task Board
//!
//! A single-user task tracker for the terminal, with a scriptable CLI and an
//! interactive board (TUI).
//!
//! ## Key Features
//!
//! - **Per-user task lists**: sign in with a display name; each name has its own list
//! - **Priorities and due dates**: urgent work floats to the top of the board
//! - **Filter and search**: pending/completed filter plus free-text search
//! - **Local file storage**: one JSON file per key under the data directory
//!
//! ## Quick Start
//!
//! ```bash
//! taskflow login alice
//! taskflow add "Buy groceries" --priority high --due tomorrow --category Personal
//! taskflow list --status pending
//! taskflow toggle "buy groceries"
//! taskflow ui
//! ```
//!
//! Data lives in `~/.taskflow/` unless `--data-dir` or `TASKFLOW_DIR` says
//! otherwise. Logs are written to `taskflow.log` in the same directory.

use clap::Parser;

pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod dates;
pub mod error;
pub mod fields;
pub mod form;
pub mod logging;
pub mod session;
pub mod storage;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod login;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::AppConfig;
use storage::FileStore;

fn main() {
    let cli = Cli::parse();

    // Completions need no data directory.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return;
    }

    let config = match AppConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let _log_guard = logging::init(&config);
    tracing::debug!(data_dir = %config.data_dir.display(), "starting");

    let mut storage = match FileStore::open(&config.data_dir) {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("Failed to open data directory: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Ui => cmd_ui(storage),

        Commands::Login { username } => cmd_login(&mut storage, username),

        Commands::Logout => cmd_logout(&mut storage),

        Commands::Whoami => cmd_whoami(&storage),

        Commands::Add { title, desc, priority, due, category } =>
            cmd_add(&mut storage, title, desc, priority, due, category),

        Commands::List { status, search } => cmd_list(&mut storage, status, search),

        Commands::View { id } => cmd_view(&mut storage, id),

        Commands::Edit { id, title, desc, priority, due, category, clear_due } =>
            cmd_edit(&mut storage, id, title, desc, priority, due, category, clear_due),

        Commands::Toggle { id } => cmd_toggle(&mut storage, id),

        Commands::Delete { id } => cmd_delete(&mut storage, id),

        Commands::Completions { shell } => cmd_completions(shell),
    }
}
