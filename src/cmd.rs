//! Command implementations for the CLI interface.
//!
//! Each subcommand resolves the active session, loads that user's task list
//! and reports the store's notices the same way the terminal UI does: success
//! messages on stdout, errors on stderr.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use chrono::Local;

use crate::board::filter_tasks;
use crate::dates::{due_day, format_due_relative};
use crate::error::SessionError;
use crate::fields::{Priority, StatusFilter};
use crate::form::{submit, submit_new, FormErrors, FormValues, Submitted};
use crate::session::Session;
use crate::storage::FileStore;
use crate::store::{NoticeLevel, TaskStore};
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive board.
    Ui,

    /// Sign in as <username>, creating their task list on first use.
    Login {
        username: String,
    },

    /// Sign out. Task data stays on disk.
    Logout,

    /// Print the signed-in username.
    Whoami,

    /// Add a new task.
    Add {
        /// Short title for the task (max 100 characters).
        title: String,
        /// Optional longer description (max 500 characters).
        #[arg(long)]
        desc: Option<String>,
        /// Priority: low | medium | high | urgent.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "in Nd", "next friday".
        #[arg(long)]
        due: Option<String>,
        /// Free-form category (max 50 characters).
        #[arg(long)]
        category: Option<String>,
    },

    /// List tasks, most urgent first.
    List {
        /// Status filter: all | pending | completed.
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        /// Case-insensitive text matched against title, description and category.
        #[arg(long)]
        search: Option<String>,
    },

    /// View a single task by id, id prefix or title.
    View {
        id: String,
    },

    /// Edit fields on a task.
    Edit {
        /// Task id, id prefix or title
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// New description; pass an empty string to clear it.
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<String>,
        /// New category; pass an empty string to clear it.
        #[arg(long)]
        category: Option<String>,
        /// Remove the due date.
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
    },

    /// Flip a task between pending and completed.
    Toggle {
        id: String,
    },

    /// Delete a task.
    Delete {
        id: String,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub const NOT_SIGNED_IN: &str = "Not signed in. Run `taskflow login <username>` first.";

/// Launch the TUI over the data directory.
pub fn cmd_ui(storage: FileStore) {
    if let Err(e) = run_tui(storage) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

pub fn cmd_login(storage: &mut FileStore, username: String) {
    match Session::sign_in(storage, &username) {
        Ok(session) => {
            let store = TaskStore::load(&mut *storage, session.username());
            println!("Signed in as {} ({} tasks).", session.username(), store.tasks().len());
        }
        Err(SessionError::EmptyUsername) => {
            eprintln!("Username cannot be empty.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to sign in: {e}");
            std::process::exit(1);
        }
    }
}

pub fn cmd_logout(storage: &mut FileStore) {
    if let Err(e) = Session::sign_out(storage) {
        eprintln!("Failed to sign out: {e}");
        std::process::exit(1);
    }
    println!("Signed out.");
}

pub fn cmd_whoami(storage: &FileStore) {
    match Session::resolve(storage) {
        Ok(Some(session)) => println!("{}", session.username()),
        Ok(None) => println!("Not signed in."),
        Err(e) => {
            eprintln!("Failed to read session: {e}");
            std::process::exit(1);
        }
    }
}

pub fn cmd_add(
    storage: &mut FileStore,
    title: String,
    desc: Option<String>,
    priority: Priority,
    due: Option<String>,
    category: Option<String>,
) {
    let mut store = open_store(storage);
    let values = FormValues {
        title,
        description: desc.unwrap_or_default(),
        priority,
        due: due.unwrap_or_default(),
        category: category.unwrap_or_default(),
    };
    match submit_new(&mut store, &values) {
        Ok(task) => {
            println!("Added {}: {}", short_id(&task.id), task.title);
            report(&mut store);
        }
        Err(errors) => exit_invalid(&errors),
    }
}

pub fn cmd_list(storage: &mut FileStore, status: StatusFilter, search: Option<String>) {
    let mut store = open_store(storage);
    let counts = store.counts();
    println!(
        "All ({}) | Pending ({}) | Completed ({})",
        counts.all, counts.pending, counts.completed
    );
    let visible = filter_tasks(store.tasks(), status, search.as_deref().unwrap_or(""));
    if visible.is_empty() {
        println!("No tasks found. There are no tasks matching your current filters.");
    } else {
        print_table(&visible);
    }
    report(&mut store);
}

pub fn cmd_view(storage: &mut FileStore, id: String) {
    let mut store = open_store(storage);
    let task = resolve_or_exit(&id, store.tasks()).clone();
    let today = Local::now().date_naive();
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", if task.completed { "Completed" } else { "Pending" });
    println!("Priority:     {}", task.priority);
    println!("Category:     {}", task.category.as_deref().unwrap_or("-"));
    println!(
        "Due:          {}",
        match task.due_date {
            Some(d) => format!("{} ({})", due_day(d), format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    println!("Created:      {}", if task.created_at.is_empty() { "-" } else { task.created_at.as_str() });
    println!("Description:\n{}", task.description.as_deref().unwrap_or("-"));
    report(&mut store);
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_edit(
    storage: &mut FileStore,
    id: String,
    title: Option<String>,
    desc: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
    category: Option<String>,
    clear_due: bool,
) {
    let mut store = open_store(storage);
    let existing = resolve_or_exit(&id, store.tasks()).clone();

    let mut values = FormValues::from_task(&existing);
    if let Some(v) = title {
        values.title = v;
    }
    if let Some(v) = desc {
        values.description = v;
    }
    if let Some(v) = priority {
        values.priority = v;
    }
    if let Some(v) = due {
        values.due = v;
    }
    if let Some(v) = category {
        values.category = v;
    }
    if clear_due {
        values.due.clear();
    }

    match submit(&mut store, &values, Some(&existing)) {
        Ok(Submitted::Updated(task)) => {
            println!("Updated {}: {}", short_id(&task.id), task.title);
            report(&mut store);
        }
        Ok(_) => {
            eprintln!("Task {} no longer exists.", short_id(&existing.id));
            std::process::exit(1);
        }
        Err(errors) => exit_invalid(&errors),
    }
}

pub fn cmd_toggle(storage: &mut FileStore, id: String) {
    let mut store = open_store(storage);
    let task_id = resolve_or_exit(&id, store.tasks()).id.clone();
    match store.toggle_completion(&task_id) {
        Some(true) => println!("Completed {}", short_id(&task_id)),
        Some(false) => println!("Reopened {}", short_id(&task_id)),
        None => println!("Task {} not found.", short_id(&task_id)),
    }
    report(&mut store);
}

pub fn cmd_delete(storage: &mut FileStore, id: String) {
    let mut store = open_store(storage);
    let task_id = resolve_or_exit(&id, store.tasks()).id.clone();
    store.delete(&task_id);
    report(&mut store);
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Load the signed-in user's store, exiting if nobody is signed in.
fn open_store(storage: &mut FileStore) -> TaskStore<&mut FileStore> {
    let session = match Session::resolve(&*storage) {
        Ok(Some(session)) => session,
        Ok(None) => {
            eprintln!("{NOT_SIGNED_IN}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to read session: {e}");
            std::process::exit(1);
        }
    };
    let mut store = TaskStore::load(storage, session.username());
    report(&mut store);
    store
}

/// Print queued notices: successes to stdout, errors to stderr.
fn report(store: &mut TaskStore<&mut FileStore>) {
    for notice in store.take_notices() {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("{}: {}", notice.title, notice.message),
        }
    }
}

fn exit_invalid(errors: &FormErrors) -> ! {
    for error in &errors.0 {
        eprintln!("Invalid {}: {}", error.field, error.message);
    }
    std::process::exit(1);
}

fn resolve_or_exit<'a>(identifier: &str, tasks: &'a [Task]) -> &'a Task {
    match resolve_task_identifier(identifier, tasks) {
        Ok(task) => task,
        Err(e) => {
            eprintln!("Error resolving task: {e}");
            std::process::exit(1);
        }
    }
}

/// Resolve a task identifier to a task.
///
/// Tried in order: exact id, unique id prefix, unique case-insensitive title.
/// Ambiguous matches are an error listing the candidates.
pub fn resolve_task_identifier<'a>(identifier: &str, tasks: &'a [Task]) -> Result<&'a Task, String> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err("Task identifier cannot be empty".into());
    }
    if let Some(task) = tasks.iter().find(|t| t.id == identifier) {
        return Ok(task);
    }

    let lowered = identifier.to_lowercase();
    let by_prefix: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.id.to_lowercase().starts_with(&lowered))
        .collect();
    if by_prefix.len() == 1 {
        return Ok(by_prefix[0]);
    }

    let by_title: Vec<&Task> = tasks.iter().filter(|t| t.title.to_lowercase() == lowered).collect();
    match (by_title.len(), by_prefix.len()) {
        (1, _) => Ok(by_title[0]),
        (0, 0) => Err(format!("No task found with id or title '{identifier}'")),
        (0, _) => Err(ambiguous(&format!("Id prefix '{identifier}' matches several tasks"), &by_prefix)),
        _ => Err(ambiguous(&format!("Multiple tasks found with title '{identifier}'"), &by_title)),
    }
}

fn ambiguous(header: &str, matches: &[&Task]) -> String {
    let mut msg = format!("{header}:\n");
    for task in matches {
        msg.push_str(&format!("  {}  {}\n", short_id(&task.id), task.title));
    }
    msg.push_str("Please use a longer id instead.");
    msg
}

/// First eight characters of an id, enough to tell tasks apart in listings.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((at, _)) => &id[..at],
        None => id,
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task]) {
    println!(
        "{:<8} {:<4} {:<8} {:<10} {:<14} {}",
        "ID", "Done", "Priority", "Due", "Category", "Title"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        println!(
            "{:<8} {:<4} {:<8} {:<10} {:<14} {}",
            short_id(&t.id),
            if t.completed { "[x]" } else { "[ ]" },
            t.priority.label(),
            format_due_relative(t.due_date, today),
            truncate(t.category.as_deref().unwrap_or("-"), 14),
            t.title
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
