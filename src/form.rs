//! Task entry form: validation and submission.
//!
//! `FormValues` is raw user input as typed into the CLI or the TUI form. It is
//! validated into a [`TaskDraft`] (all failing fields reported together) and
//! submitted to the store either as a new task or as an edit of an existing one.

use std::fmt;

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::dates::{due_day, local_midnight_utc, parse_due_input_on};
use crate::fields::Priority;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::task::{Task, TaskDraft, MAX_CATEGORY_LEN, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    DueDate,
    Category,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FormField::Title => "title",
            FormField::Description => "description",
            FormField::DueDate => "due date",
            FormField::Category => "category",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// Every field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summarize(.0))]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    /// Message for `field`, if it failed.
    pub fn message_for(&self, field: FormField) -> Option<&str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message.as_str())
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due: String,
    pub category: String,
}

impl Default for FormValues {
    fn default() -> Self {
        FormValues {
            title: String::new(),
            description: String::new(),
            priority: Priority::Medium,
            due: String::new(),
            category: String::new(),
        }
    }
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    Created(Task),
    Updated(Task),
    /// The task being edited no longer exists; nothing was written.
    Missing,
}

impl FormValues {
    /// Pre-fill the form from an existing task.
    pub fn from_task(task: &Task) -> Self {
        FormValues {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            priority: task.priority,
            due: task
                .due_date
                .map(|d| due_day(d).format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            category: task.category.clone().unwrap_or_default(),
        }
    }

    /// Validate against the local calendar day.
    pub fn validate(&self, editing: Option<&Task>) -> Result<TaskDraft, FormErrors> {
        self.validate_on(Local::now().date_naive(), editing)
    }

    /// Validate and normalise into a draft.
    ///
    /// Due dates before `today` are rejected, except an unchanged due date of
    /// the task being edited, which is kept as stored.
    pub fn validate_on(&self, today: NaiveDate, editing: Option<&Task>) -> Result<TaskDraft, FormErrors> {
        let mut errors = Vec::new();
        let mut fail = |field, message: &str| {
            errors.push(FieldError { field, message: message.to_string() })
        };

        let title = self.title.trim();
        if title.is_empty() {
            fail(FormField::Title, "Title is required.");
        } else if title.chars().count() > MAX_TITLE_LEN {
            fail(FormField::Title, "Title must be at most 100 characters.");
        }

        let description = non_blank(&self.description);
        if description.as_ref().is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN) {
            fail(FormField::Description, "Description must be at most 500 characters.");
        }

        let category = non_blank(&self.category);
        if category.as_ref().is_some_and(|c| c.chars().count() > MAX_CATEGORY_LEN) {
            fail(FormField::Category, "Category must be at most 50 characters.");
        }

        let mut due_date = None;
        if let Some(text) = non_blank(&self.due) {
            let existing = editing.and_then(|t| t.due_date);
            match parse_due_input_on(&text, today) {
                None => fail(
                    FormField::DueDate,
                    "Unrecognised due date. Use YYYY-MM-DD, 'today', 'tomorrow', or 'in Nd'.",
                ),
                Some(day) if existing.is_some_and(|d| due_day(d) == day) => due_date = existing,
                Some(day) if day < today => fail(FormField::DueDate, "Due date cannot be in the past."),
                Some(day) => match local_midnight_utc(day) {
                    Some(at) => due_date = Some(at),
                    None => fail(FormField::DueDate, "Due date does not exist in the local time zone."),
                },
            }
        }

        if !errors.is_empty() {
            return Err(FormErrors(errors));
        }
        Ok(TaskDraft {
            title: title.to_string(),
            description,
            priority: self.priority,
            due_date,
            category,
        })
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Validate `values` and hand them to the store.
///
/// Without `editing` a new task is added. With `editing` the submitted fields
/// are merged into that task, keeping its id, completion state and creation
/// time, and the store entry is replaced.
pub fn submit<S: KeyValueStore>(
    store: &mut TaskStore<S>,
    values: &FormValues,
    editing: Option<&Task>,
) -> Result<Submitted, FormErrors> {
    let draft = values.validate(editing)?;
    Ok(apply(store, draft, editing))
}

/// Validate `values` and add them as a new task.
pub fn submit_new<S: KeyValueStore>(store: &mut TaskStore<S>, values: &FormValues) -> Result<Task, FormErrors> {
    let draft = values.validate(None)?;
    Ok(store.add(draft))
}

fn apply<S: KeyValueStore>(store: &mut TaskStore<S>, draft: TaskDraft, editing: Option<&Task>) -> Submitted {
    match editing {
        None => Submitted::Created(store.add(draft)),
        Some(existing) => {
            let merged = Task {
                title: draft.title,
                description: draft.description,
                priority: draft.priority,
                due_date: draft.due_date,
                category: draft.category,
                ..existing.clone()
            };
            if store.update(merged.clone()) {
                Submitted::Updated(merged)
            } else {
                Submitted::Missing
            }
        }
    }
}
