//! Task domain model.
//!
//! # Responsibility
//! - Define the kanban task record and its create/update payloads.
//! - Normalize tags and validate titles before a task enters the board.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is non-empty after trimming.
//! - `tags` keep insertion order and contain no duplicates.
//! - `column` is always one of the three board columns.

use crate::model::timestamp::{iso_millis, parse_due_date, Timestamp};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task on the board.
pub type TaskId = Uuid;

/// Task urgency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Stable wire/display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Parses a priority name, ignoring ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kanban column a task currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Todo,
    Doing,
    Done,
}

impl Column {
    /// Board columns in rendering order.
    pub const ALL: [Column; 3] = [Column::Todo, Column::Doing, Column::Done];

    /// Stable wire/display name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::Doing => "Doing",
            Self::Done => "Done",
        }
    }

    /// Parses a column name, ignoring ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for task payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty or whitespace only.
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record persisted under the `tasks` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    /// Free-form date string, usually `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub column: Column,
    #[serde(with = "iso_millis")]
    pub created_at: Timestamp,
}

impl Task {
    /// Builds a task from a validated draft with store-assigned identity.
    pub fn from_draft(id: TaskId, created_at: Timestamp, draft: TaskDraft) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            priority: draft.priority,
            due_date: draft.due_date,
            tags: normalize_tags(&draft.tags),
            column: draft.column,
            created_at,
        }
    }

    /// Shallow-merges every field present in `update` over this task.
    pub fn apply_update(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(tags) = update.tags {
            self.tags = normalize_tags(&tags);
        }
        if let Some(column) = update.column {
            self.column = column;
        }
    }

    /// Instant the task falls due; blank or unparseable strings count as
    /// absent.
    pub fn due_at(&self) -> Option<Timestamp> {
        self.due_date.as_deref().and_then(parse_due_date)
    }

    /// Past its due instant and not yet in `Done`.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        self.column != Column::Done && self.due_at().is_some_and(|due| due < now)
    }
}

/// Caller-provided fields for a new task.
///
/// Identity and creation time are assigned by the task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub column: Column,
}

impl TaskDraft {
    /// Creates a draft with `Medium` priority in the `Todo` column.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            due_date: None,
            tags: Vec::new(),
            column: Column::Todo,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.column = column;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }
}

/// Partial task fields for `updateTask`; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub column: Option<Column>,
}

impl TaskUpdate {
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }
}

fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(())
}

/// Trims tags, drops empty values and removes duplicates keeping first
/// occurrence order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || normalized.iter().any(|existing| existing == trimmed) {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}
