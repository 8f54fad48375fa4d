//! Enumerations for TUI state management.

/// Screen shown by the board application.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Board,
    AddTask,
    EditTask,
    Help,
    Confirm,
}

/// Why the board application stopped.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppExit {
    Quit,
    Logout,
}
