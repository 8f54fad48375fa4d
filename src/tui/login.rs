//! Sign-in screen shown when no user is active.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::error::SessionError;
use crate::session::Session;
use crate::storage::KeyValueStore;
use crate::tui::{colors::{BAR_BLUE, DARK_RED, GOLD}, input::InputField, utils::centered_rect};

/// Username prompt. Ends with a session, or with none if the user quit.
pub struct LoginApp<'a, S: KeyValueStore> {
    storage: &'a mut S,
    input: InputField,
    status_message: String,
    session: Option<Session>,
    should_exit: bool,
}

impl<'a, S: KeyValueStore> LoginApp<'a, S> {
    pub fn new(storage: &'a mut S) -> Self {
        let mut input = InputField::new();
        input.active = true;
        Self {
            storage,
            input,
            status_message: String::new(),
            session: None,
            should_exit: false,
        }
    }

    /// Handle one key press. Returns true once the screen is done.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.status_message.clear();
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => self.should_exit = true,
            KeyCode::Esc => self.should_exit = true,
            KeyCode::Enter => match Session::sign_in(&mut *self.storage, &self.input.value) {
                Ok(session) => {
                    self.session = Some(session);
                    self.should_exit = true;
                }
                Err(SessionError::EmptyUsername) => {
                    self.status_message = "Please enter a username.".to_string();
                }
                Err(e) => {
                    tracing::error!(error = %e, "sign in failed");
                    self.status_message = format!("Error: {e}");
                }
            },
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Char(c) => self.input.handle_char(c),
            _ => {}
        }
        self.should_exit
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_prompt(f, chunks[0]);
        self.render_status_bar(f, chunks[1]);
    }

    fn render_prompt(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(50, 40, area);
        f.render_widget(Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Greeting
                Constraint::Length(3), // Input field
                Constraint::Min(0),
            ])
            .split(area);

        let greeting = Paragraph::new(vec![
            Line::from(Span::styled("Welcome!", Style::default().add_modifier(Modifier::BOLD))),
            Line::from("Enter your username to get started."),
        ])
        .block(Block::default().borders(Borders::ALL).title("TaskFlow"))
        .alignment(Alignment::Center);
        f.render_widget(greeting, chunks[0]);

        let (text, style) = if self.input.value.is_empty() {
            ("e.g. jane_doe", Style::default().fg(Color::DarkGray))
        } else {
            (self.input.value.as_str(), Style::default())
        };
        let input = Paragraph::new(Span::styled(text, style)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Username")
                .border_style(Style::default().fg(GOLD)),
        );
        f.render_widget(input, chunks[1]);

        f.set_cursor_position((chunks[1].x + 1 + self.input.cursor as u16, chunks[1].y + 1));
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let (text, bg) = if self.status_message.is_empty() {
            ("Type a username, Enter to continue, Esc to quit".to_string(), BAR_BLUE)
        } else {
            (self.status_message.clone(), DARK_RED)
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(bg).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Run until the user signs in or quits.
    pub fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<Option<Session>> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::USERNAME_KEY;
    use crate::storage::MemoryStore;

    fn type_text<S: KeyValueStore>(login: &mut LoginApp<'_, S>, text: &str) {
        for c in text.chars() {
            login.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_blank_username_is_rejected() {
        let mut storage = MemoryStore::new();
        let mut login = LoginApp::new(&mut storage);
        type_text(&mut login, "   ");
        assert!(!login.handle_key(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(login.status_message, "Please enter a username.");
        assert!(login.session.is_none());
        drop(login);
        assert_eq!(storage.get(USERNAME_KEY), None);
    }

    #[test]
    fn test_enter_signs_in_trimmed_name() {
        let mut storage = MemoryStore::new();
        let mut login = LoginApp::new(&mut storage);
        type_text(&mut login, " jane_doe ");
        assert!(login.handle_key(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(login.session.as_ref().map(|s| s.username()), Some("jane_doe"));
        drop(login);
        assert_eq!(storage.get(USERNAME_KEY), Some("jane_doe"));
    }

    #[test]
    fn test_storage_failure_is_reported() {
        let mut storage = MemoryStore::new();
        storage.set_fail_writes(true);
        let mut login = LoginApp::new(&mut storage);
        type_text(&mut login, "amy");
        assert!(!login.handle_key(KeyCode::Enter, KeyModifiers::NONE));
        assert!(login.status_message.starts_with("Error:"));
    }

    #[test]
    fn test_escape_quits_without_session() {
        let mut storage = MemoryStore::new();
        let mut login = LoginApp::new(&mut storage);
        assert!(login.handle_key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(login.session.is_none());
    }
}
