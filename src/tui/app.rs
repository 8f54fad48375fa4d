//! Main application logic for the terminal user interface.
//!
//! `App` owns the signed-in user's [`TaskStore`] and a memoized [`BoardView`].
//! It handles key input per screen (board, form, help, delete confirmation),
//! renders them, and surfaces store notices in the status bar.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::board::BoardView;
use crate::dates::format_due_relative;
use crate::fields::StatusFilter;
use crate::form::{submit, Submitted};
use crate::storage::KeyValueStore;
use crate::store::{NoticeLevel, TaskStore};
use crate::task::Task;
use crate::tui::{
    colors::{notice_color, priority_color, BAR_BLUE, DARK_RED, GOLD},
    enums::{AppExit, AppState},
    input::InputField,
    task_form::{
        TaskForm, CATEGORY_GLOBAL_ORDER, DESCRIPTION_GLOBAL_ORDER, DUE_GLOBAL_ORDER,
        PRIORITY_GLOBAL_ORDER, TITLE_GLOBAL_ORDER,
    },
    utils::centered_rect,
};

/// Board application for one signed-in user.
pub struct App<S: KeyValueStore> {
    state: AppState,
    store: TaskStore<S>,
    username: String,
    board: BoardView,
    visible: Vec<String>,
    task_list_state: TableState,
    task_form: TaskForm,
    status_message: String,
    status_level: Option<NoticeLevel>,
    search_active: bool,
    confirm_task: Option<(String, String)>,
    exit: Option<AppExit>,
}

impl<S: KeyValueStore> App<S> {
    /// Create the board over an already loaded store.
    pub fn new(store: TaskStore<S>, username: &str) -> Self {
        let mut app = App {
            state: AppState::Board,
            store,
            username: username.to_string(),
            board: BoardView::new(),
            visible: Vec::new(),
            task_list_state: TableState::default(),
            task_form: TaskForm::new(),
            status_message: String::new(),
            status_level: None,
            search_active: false,
            confirm_task: None,
            exit: None,
        };
        app.refresh_visible();
        app.show_notices();
        app
    }

    /// Recompute the visible ids, keeping the selected task selected if it
    /// is still visible.
    fn refresh_visible(&mut self) {
        let selected_id = self.selected_task().map(|t| t.id.clone());
        self.visible = self
            .board
            .visible_ids(self.store.tasks(), self.store.revision())
            .to_vec();

        let position = selected_id.and_then(|id| self.visible.iter().position(|v| *v == id));
        let selection = match (position, self.task_list_state.selected()) {
            _ if self.visible.is_empty() => None,
            (Some(p), _) => Some(p),
            (None, Some(s)) => Some(s.min(self.visible.len() - 1)),
            (None, None) => Some(0),
        };
        self.task_list_state.select(selection);
    }

    fn selected_task(&self) -> Option<&Task> {
        let id = self.visible.get(self.task_list_state.selected()?)?;
        self.store.get(id)
    }

    /// Move the newest store notice into the status bar.
    fn show_notices(&mut self) {
        if let Some(notice) = self.store.take_notices().pop() {
            self.status_message = notice.message;
            self.status_level = Some(notice.level);
        }
    }

    fn set_status_message(&mut self, msg: &str) {
        self.status_message = msg.to_string();
        self.status_level = None;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
        self.status_level = None;
    }

    /// Dispatch one key press to the current screen.
    /// Returns true if the application should stop.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            self.exit = Some(AppExit::Quit);
            return true;
        }
        self.clear_status_message();
        match self.state {
            AppState::Board if self.search_active => self.handle_search_input(key),
            AppState::Board => self.handle_board_input(key),
            AppState::AddTask | AppState::EditTask => self.handle_form_input(key),
            AppState::Help => self.handle_help_input(key),
            AppState::Confirm => self.handle_confirm_input(key),
        }
        self.exit.is_some()
    }

    fn handle_search_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.search_active = false;
                self.board.search.clear();
            }
            KeyCode::Enter => {
                self.search_active = false;
            }
            KeyCode::Backspace => {
                self.board.search.pop();
            }
            KeyCode::Char(c) => {
                self.board.search.push(c);
            }
            _ => {}
        }
        self.refresh_visible();
    }

    fn handle_board_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.exit = Some(AppExit::Quit),
            KeyCode::Esc => {
                if self.board.search.is_empty() {
                    self.exit = Some(AppExit::Quit);
                } else {
                    self.board.search.clear();
                    self.refresh_visible();
                }
            }
            KeyCode::Char('L') => self.exit = Some(AppExit::Logout),
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(selected) = self.task_list_state.selected() {
                    self.task_list_state.select(Some(selected.saturating_sub(1)));
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(selected) = self.task_list_state.selected() {
                    if selected + 1 < self.visible.len() {
                        self.task_list_state.select(Some(selected + 1));
                    }
                }
            }
            KeyCode::Char('/') => {
                self.search_active = true;
            }
            KeyCode::Char('f') | KeyCode::Tab => {
                self.board.filter = self.board.filter.next();
                self.refresh_visible();
            }
            KeyCode::Char('a') => {
                self.task_form = TaskForm::new();
                self.state = AppState::AddTask;
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(form) = self.selected_task().map(TaskForm::from_task) {
                    self.task_form = form;
                    self.state = AppState::EditTask;
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('c') => {
                if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
                    self.store.toggle_completion(&id);
                    self.refresh_visible();
                    self.show_notices();
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(target) = self.selected_task().map(|t| (t.id.clone(), t.title.clone())) {
                    self.confirm_task = Some(target);
                    self.state = AppState::Confirm;
                }
            }
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            _ => {}
        }
    }

    fn handle_form_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.state = AppState::Board,
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
    }

    /// Validate the form and hand it to the store. On validation failure the
    /// form stays open with per-field messages.
    fn submit_form(&mut self) {
        let values = self.task_form.to_values();
        match submit(&mut self.store, &values, self.task_form.editing.as_ref()) {
            Ok(result) => {
                self.state = AppState::Board;
                self.task_form.errors = None;
                if let Submitted::Created(task) = &result {
                    // Reveal the new task even if the filter would hide it.
                    if !self.board.filter.matches(task.completed) {
                        self.board.filter = StatusFilter::All;
                    }
                }
                self.refresh_visible();
                if let Submitted::Created(task) | Submitted::Updated(task) = &result {
                    let position = self.visible.iter().position(|id| *id == task.id);
                    if position.is_some() {
                        self.task_list_state.select(position);
                    }
                }
                if result == Submitted::Missing {
                    self.set_status_message("That task no longer exists.");
                }
                self.show_notices();
            }
            Err(errors) => {
                self.task_form.errors = Some(errors);
                self.set_status_message("Please fix the highlighted fields.");
            }
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some((id, _)) = self.confirm_task.take() {
                    self.store.delete(&id);
                    self.refresh_visible();
                    self.show_notices();
                }
                self.state = AppState::Board;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_task = None;
                self.state = AppState::Board;
            }
            _ => {}
        }
    }

    fn handle_help_input(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h')) {
            self.state = AppState::Board;
        }
    }

    /// Poll for one key event and handle it.
    /// Returns true if the application should stop.
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

    /// Render the header, filter tabs, optional search line and task table.
    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        let show_search = self.search_active || !self.board.search.is_empty();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(if show_search { 3 } else { 0 }),
                Constraint::Min(0),
            ])
            .split(area);

        let counts = self.store.counts();
        let mut header = vec![
            Span::styled("TASKFLOW", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("Signed in as {}", self.username),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
            Span::raw("    "),
        ];
        for (filter, count) in [
            (StatusFilter::All, counts.all),
            (StatusFilter::Pending, counts.pending),
            (StatusFilter::Completed, counts.completed),
        ] {
            let style = if filter == self.board.filter {
                Style::default().fg(Color::Black).bg(GOLD).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            header.push(Span::styled(format!(" {} ({}) ", filter.label(), count), style));
            header.push(Span::raw(" "));
        }
        let header_block = Paragraph::new(Line::from(header))
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, chunks[0]);

        if show_search {
            let border = if self.search_active { GOLD } else { Color::Gray };
            let search = Paragraph::new(self.board.search.as_str()).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Search title, description or category")
                    .border_style(Style::default().fg(border)),
            );
            f.render_widget(search, chunks[1]);
            if self.search_active {
                let typed = self.board.search.chars().count() as u16;
                f.set_cursor_position((chunks[1].x + 1 + typed, chunks[1].y + 1));
            }
        }

        if self.visible.is_empty() {
            self.render_empty(f, chunks[2]);
            return;
        }

        let today = Local::now().date_naive();
        let header_cells = ["", "Priority", "Due", "Category", "Title"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(BAR_BLUE).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = self
            .visible
            .iter()
            .filter_map(|id| self.store.get(id))
            .map(|task| {
                let style = if task.completed {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(Color::White)
                };
                let priority_style = if task.completed {
                    style
                } else {
                    Style::default().fg(priority_color(task.priority))
                };
                Row::new(vec![
                    Cell::from(if task.completed { "[x]" } else { "[ ]" }),
                    Cell::from(task.priority.label()).style(priority_style),
                    Cell::from(format_due_relative(task.due_date, today)),
                    Cell::from(task.category.as_deref().unwrap_or("-").to_string()),
                    Cell::from(task.title.clone()),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Min(20),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}/{}) - Press 'h' for help",
                self.visible.len(),
                counts.all
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[2], &mut self.task_list_state);
    }

    fn render_empty(&self, f: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("No tasks found", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("There are no tasks matching your current filters."),
        ];
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Tasks"))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
    }

    /// Render the add/edit form with validation messages beside each field.
    fn render_task_form(&mut self, f: &mut Frame, area: Rect, is_edit: bool) {
        let outer = Block::default()
            .borders(Borders::ALL)
            .title(if is_edit { "Edit Task" } else { "Add New Task" });
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(5), // Description
                Constraint::Length(3), // Priority
                Constraint::Length(3), // Due
                Constraint::Length(3), // Category
                Constraint::Min(0),    // Instructions
            ])
            .split(inner);

        let form = &self.task_form;
        let fields: [(usize, &str, &InputField, usize); 4] = [
            (TITLE_GLOBAL_ORDER, "Title *", &form.title, 0),
            (DESCRIPTION_GLOBAL_ORDER, "Description", &form.description, 1),
            (DUE_GLOBAL_ORDER, "Due Date (YYYY-MM-DD, today, tomorrow, in 3d)", &form.due, 3),
            (CATEGORY_GLOBAL_ORDER, "Category (e.g. Work, Personal)", &form.category, 4),
        ];
        for (order, label, input, chunk) in fields {
            let block = field_block(label, form.current_field == order, form.error_for(order));
            let widget = Paragraph::new(input.value.as_str())
                .block(block)
                .wrap(Wrap { trim: false });
            f.render_widget(widget, chunks[chunk]);
        }

        let priority = form.selected_priority();
        let selector = Paragraph::new(Line::from(vec![
            Span::raw("< "),
            Span::styled(priority.label(), Style::default().fg(priority_color(priority))),
            Span::raw(" >"),
        ]))
        .block(field_block("Priority", form.current_field == PRIORITY_GLOBAL_ORDER, None));
        f.render_widget(selector, chunks[2]);

        let instructions = Paragraph::new(
            "Tab/↑↓ move between fields  ←→ change priority  Enter save  Esc cancel",
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(instructions, chunks[5]);

        let cursor_target = match form.current_field {
            TITLE_GLOBAL_ORDER => Some((&form.title, chunks[0])),
            DESCRIPTION_GLOBAL_ORDER => Some((&form.description, chunks[1])),
            DUE_GLOBAL_ORDER => Some((&form.due, chunks[3])),
            CATEGORY_GLOBAL_ORDER => Some((&form.category, chunks[4])),
            _ => None,
        };
        if let Some((input, rect)) = cursor_target {
            let width = rect.width.saturating_sub(2).max(1);
            let cursor = input.cursor as u16;
            f.set_cursor_position((rect.x + 1 + cursor % width, rect.y + 1 + cursor / width));
        }
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("TaskFlow Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Board:", bold)),
            Line::from("  ↑↓ / k j     Move selection"),
            Line::from("  Space / c    Toggle completed"),
            Line::from("  a            Add new task"),
            Line::from("  e / Enter    Edit selected task"),
            Line::from("  d / Del      Delete selected task"),
            Line::from("  f / Tab      Cycle filter (All → Pending → Completed)"),
            Line::from("  /            Search title, description and category"),
            Line::from("  L            Log out"),
            Line::from("  h / F1       Show this help"),
            Line::from("  q / Esc      Quit"),
            Line::from(""),
            Line::from(Span::styled("Form:", bold)),
            Line::from("  Tab / ↑↓     Move between fields"),
            Line::from("  ← →          Change priority"),
            Line::from("  Enter        Save"),
            Line::from("  Esc          Cancel"),
            Line::from(""),
            Line::from(Span::styled("Due Date Formats:", bold)),
            Line::from("  YYYY-MM-DD   Specific date (e.g., 2030-12-25)"),
            Line::from("  today, tomorrow, eow, eom, weekend"),
            Line::from("  in 3d, in 2w, in 1m"),
            Line::from("  friday, next monday"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press Esc to return"))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the delete confirmation over the board.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Are you sure?")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let title = self.confirm_task.as_ref().map_or("", |(_, title)| title.as_str());
        let text = vec![
            Line::from(""),
            Line::from("This action cannot be undone. This will permanently delete the task"),
            Line::from(Span::styled(format!("\"{title}\""), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("Press 'y' to delete, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.search_active {
            format!("Search: {} (Esc to clear, Enter to confirm)", self.board.search)
        } else {
            match self.state {
                AppState::Board => format!(
                    "{} | {} shown | a add  e edit  space toggle  d delete  / search  f filter  L logout  h help",
                    self.board.filter.label(),
                    self.visible.len()
                ),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::EditTask => "Edit Task".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Delete".to_string(),
            }
        };

        let bg = self.status_level.map_or(BAR_BLUE, notice_color);
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(bg).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::Board => self.render_board(f, chunks[0]),
            AppState::AddTask => self.render_task_form(f, chunks[0], false),
            AppState::EditTask => self.render_task_form(f, chunks[0], true),
            AppState::Help => self.render_help(f, chunks[0]),
            AppState::Confirm => {
                self.render_board(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop. Runs until the user quits or logs out.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<AppExit> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(self.exit.unwrap_or(AppExit::Quit))
    }
}

/// Bordered block for a form field; gold when focused, red with the message
/// appended to the label when invalid.
fn field_block(label: &str, focused: bool, error: Option<&str>) -> Block<'static> {
    let (title, color) = match error {
        Some(message) => (format!("{label} - {message}"), Some(Color::LightRed)),
        None => (label.to_string(), focused.then_some(GOLD)),
    };
    let border = match (color, focused) {
        (Some(c), true) => Style::default().fg(c).add_modifier(Modifier::BOLD),
        (Some(c), false) => Style::default().fg(c),
        (None, _) => Style::default(),
    };
    Block::default().borders(Borders::ALL).title(title).border_style(border)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use crate::storage::MemoryStore;

    fn app() -> App<MemoryStore> {
        App::new(TaskStore::load(MemoryStore::new(), "amy"), "amy")
    }

    fn press(app: &mut App<MemoryStore>, key: KeyCode) -> bool {
        app.handle_key(key, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_board_orders_by_priority() {
        let app = app();
        assert_eq!(app.visible, ["4", "1", "2", "5", "3"]);
        assert_eq!(app.selected_task().map(|t| t.id.as_str()), Some("4"));
    }

    #[test]
    fn test_filter_cycles() {
        let mut app = app();
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.board.filter, StatusFilter::Pending);
        assert_eq!(app.visible, ["4", "1", "3"]);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.visible, ["2", "5"]);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.visible.len(), 5);
    }

    #[test]
    fn test_search_mode_and_empty_state() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "groc");
        assert_eq!(app.visible, ["5"]);
        type_text(&mut app, "zzz");
        assert!(app.visible.is_empty());
        assert_eq!(app.task_list_state.selected(), None);
        press(&mut app, KeyCode::Esc);
        assert!(!app.search_active);
        assert_eq!(app.visible.len(), 5);
    }

    #[test]
    fn test_toggle_keeps_selection_and_persists() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_task().map(|t| t.id.as_str()), Some("1"));
        press(&mut app, KeyCode::Char(' '));
        assert!(app.store.get("1").is_some_and(|t| t.completed));
        assert_eq!(app.selected_task().map(|t| t.id.as_str()), Some("1"));
        assert!(app.status_message.is_empty());
    }

    #[test]
    fn test_add_task_through_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state, AppState::AddTask);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::AddTask);
        assert_eq!(app.task_form.error_for(TITLE_GLOBAL_ORDER), Some("Title is required."));

        type_text(&mut app, "Call mom");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.state, AppState::Board);
        assert_eq!(app.store.tasks().len(), 6);
        let added = &app.store.tasks()[0];
        assert_eq!(added.title, "Call mom");
        assert_eq!(added.priority, Priority::Urgent);
        assert_eq!(app.status_message, "Task added successfully.");
        assert_eq!(app.status_level, Some(NoticeLevel::Success));
        assert_eq!(app.selected_task().map(|t| t.title.as_str()), Some("Call mom"));
    }

    #[test]
    fn test_edit_task_through_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.state, AppState::EditTask);
        type_text(&mut app, " now");
        press(&mut app, KeyCode::Enter);
        let task = app.store.get("4").unwrap();
        assert_eq!(task.title, "Submit project proposal now");
        assert_eq!(app.status_message, "Task updated successfully.");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.state, AppState::Confirm);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store.tasks().len(), 5);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.state, AppState::Board);
        assert!(app.store.get("4").is_none());
        assert_eq!(app.visible, ["1", "2", "5", "3"]);
        assert_eq!(app.status_message, "Task deleted successfully.");
    }

    #[test]
    fn test_save_failure_shows_error_notice() {
        let mut storage = MemoryStore::new();
        storage.set_fail_writes(true);
        let mut app = App::new(TaskStore::load(storage, "amy"), "amy");
        press(&mut app, KeyCode::Char(' '));
        assert!(app.store.get("4").is_some_and(|t| t.completed));
        assert_eq!(app.status_level, Some(NoticeLevel::Error));
        assert_eq!(app.status_message, crate::store::SAVE_FAILED);
    }

    #[test]
    fn test_quit_and_logout_keys() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('L')));
        assert_eq!(app.exit, Some(AppExit::Logout));

        let mut app = self::app();
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.exit, Some(AppExit::Quit));
    }
}
