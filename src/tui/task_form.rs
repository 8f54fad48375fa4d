//! Task form handling for the terminal user interface.
//!
//! `TaskForm` holds the text typed into the add/edit screen, the priority
//! selector and the validation messages from the last submit attempt.

use crate::fields::Priority;
use crate::form::{FormErrors, FormField, FormValues};
use crate::task::Task;
use crate::tui::input::InputField;

/// Global order constants for form fields.
pub const TITLE_GLOBAL_ORDER: usize = 0;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 1;
pub const PRIORITY_GLOBAL_ORDER: usize = 2;
pub const DUE_GLOBAL_ORDER: usize = 3;
pub const CATEGORY_GLOBAL_ORDER: usize = 4;

const FIELD_COUNT: usize = 5;

/// Task form for adding or editing a task.
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub due: InputField,
    pub category: InputField,
    /// Index into [`Priority::ALL`].
    pub priority: usize,
    pub current_field: usize,
    /// Messages from the last rejected submit.
    pub errors: Option<FormErrors>,
    /// The task being edited, as it was when the form opened.
    pub editing: Option<Task>,
}

impl TaskForm {
    /// An empty form with medium priority.
    pub fn new() -> Self {
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            due: InputField::new(),
            category: InputField::new(),
            priority: priority_index(Priority::default()),
            current_field: TITLE_GLOBAL_ORDER,
            errors: None,
            editing: None,
        };
        form.update_active_field();
        form
    }

    /// A form pre-filled from `task`.
    pub fn from_task(task: &Task) -> Self {
        let values = FormValues::from_task(task);
        let mut form = Self::new();
        form.title = InputField::with_value(&values.title);
        form.description = InputField::with_value(&values.description);
        form.due = InputField::with_value(&values.due);
        form.category = InputField::with_value(&values.category);
        form.priority = priority_index(values.priority);
        form.editing = Some(task.clone());
        form.update_active_field();
        form
    }

    /// Current input as raw form values.
    pub fn to_values(&self) -> FormValues {
        FormValues {
            title: self.title.value.clone(),
            description: self.description.value.clone(),
            priority: self.selected_priority(),
            due: self.due.value.clone(),
            category: self.category.value.clone(),
        }
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority % Priority::ALL.len()]
    }

    /// Validation message for the field at `order`, if any.
    pub fn error_for(&self, order: usize) -> Option<&str> {
        let field = match order {
            TITLE_GLOBAL_ORDER => FormField::Title,
            DESCRIPTION_GLOBAL_ORDER => FormField::Description,
            DUE_GLOBAL_ORDER => FormField::DueDate,
            CATEGORY_GLOBAL_ORDER => FormField::Category,
            _ => return None,
        };
        self.errors.as_ref()?.message_for(field)
    }

    fn current_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_GLOBAL_ORDER => Some(&mut self.title),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            DUE_GLOBAL_ORDER => Some(&mut self.due),
            CATEGORY_GLOBAL_ORDER => Some(&mut self.category),
            _ => None,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FIELD_COUNT - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        for field in [&mut self.title, &mut self.description, &mut self.due, &mut self.category] {
            field.active = false;
        }
        if let Some(field) = self.current_input() {
            field.active = true;
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.current_input() {
            field.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.current_input() {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(field) = self.current_input() {
            field.handle_delete();
        }
    }

    /// Left/right move the cursor in text fields and cycle the priority selector.
    pub fn handle_left_right(&mut self, right: bool) {
        if self.current_field == PRIORITY_GLOBAL_ORDER {
            let len = Priority::ALL.len();
            self.priority = if right {
                (self.priority + 1) % len
            } else if self.priority == 0 {
                len - 1
            } else {
                self.priority - 1
            };
        } else if let Some(field) = self.current_input() {
            if right {
                field.move_cursor_right();
            } else {
                field.move_cursor_left();
            }
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

fn priority_index(priority: Priority) -> usize {
    Priority::ALL.iter().position(|&p| p == priority).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sample_tasks;
    use chrono::Utc;

    #[test]
    fn test_new_form_defaults() {
        let form = TaskForm::new();
        assert_eq!(form.selected_priority(), Priority::Medium);
        assert!(form.title.active);
        assert!(form.editing.is_none());
        assert_eq!(form.to_values(), FormValues::default());
    }

    #[test]
    fn test_field_cycling_wraps() {
        let mut form = TaskForm::new();
        form.prev_field();
        assert_eq!(form.current_field, CATEGORY_GLOBAL_ORDER);
        assert!(form.category.active && !form.title.active);
        form.next_field();
        form.next_field();
        form.next_field();
        assert_eq!(form.current_field, PRIORITY_GLOBAL_ORDER);
        assert!(!form.description.active);
    }

    #[test]
    fn test_priority_selector_wraps() {
        let mut form = TaskForm::new();
        form.current_field = PRIORITY_GLOBAL_ORDER;
        form.handle_left_right(true);
        form.handle_left_right(true);
        assert_eq!(form.selected_priority(), Priority::Urgent);
        form.handle_left_right(true);
        assert_eq!(form.selected_priority(), Priority::Low);
        form.handle_left_right(false);
        assert_eq!(form.selected_priority(), Priority::Urgent);
        form.handle_char('x');
        assert_eq!(form.to_values().title, "");
    }

    #[test]
    fn test_typing_goes_to_current_field() {
        let mut form = TaskForm::new();
        for c in "Buy milk".chars() {
            form.handle_char(c);
        }
        form.next_field();
        form.handle_char('2');
        form.handle_backspace();
        form.handle_char('1');
        let values = form.to_values();
        assert_eq!(values.title, "Buy milk");
        assert_eq!(values.description, "1");
    }

    #[test]
    fn test_from_task_round_trips_values() {
        let task = sample_tasks(Utc::now()).remove(0);
        let form = TaskForm::from_task(&task);
        assert_eq!(form.to_values(), FormValues::from_task(&task));
        assert_eq!(form.editing.as_ref().map(|t| t.id.as_str()), Some(task.id.as_str()));
    }

    #[test]
    fn test_error_lookup_by_field() {
        let mut form = TaskForm::new();
        form.errors = form.to_values().validate(None).err();
        assert_eq!(form.error_for(TITLE_GLOBAL_ORDER), Some("Title is required."));
        assert_eq!(form.error_for(PRIORITY_GLOBAL_ORDER), None);
        assert_eq!(form.error_for(CATEGORY_GLOBAL_ORDER), None);
    }
}
