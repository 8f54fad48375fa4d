//! TUI entry point and terminal setup.

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::CrosstermBackend, Terminal};

use crate::session::Session;
use crate::storage::{FileStore, KeyValueStore};
use crate::store::TaskStore;
use crate::tui::{app::App, enums::AppExit, login::LoginApp};

/// Initialise the terminal and run the sign-in and board screens until the
/// user quits. The terminal is restored even if a screen fails.
pub fn run_tui(mut storage: FileStore) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::info!("ui started");
    let result = run_screens(&mut terminal, &mut storage);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "ui exited with error");
    }
    result
}

/// Sign-in, then the board; logging out returns to sign-in.
fn run_screens<B: Backend, S: KeyValueStore>(terminal: &mut Terminal<B>, storage: &mut S) -> io::Result<()> {
    loop {
        let session = match Session::resolve(&*storage).map_err(io::Error::other)? {
            Some(session) => session,
            None => match LoginApp::new(&mut *storage).run(terminal)? {
                Some(session) => session,
                None => return Ok(()),
            },
        };

        let store = TaskStore::load(&mut *storage, session.username());
        let mut app = App::new(store, session.username());
        let exit = app.run(terminal)?;
        drop(app);

        match exit {
            AppExit::Quit => return Ok(()),
            AppExit::Logout => Session::sign_out(&mut *storage).map_err(io::Error::other)?,
        }
    }
}
