//! Transient view controls and the derived visible-task query.
//!
//! # Invariants
//! - View controls are never persisted and reset to defaults on load.
//! - `visible_tasks` never reorders ties: sorting is stable over collection
//!   order.

use crate::model::task::{Column, Priority, Task};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Priority filter applied to the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn matches(self, priority: Priority) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == priority,
        }
    }

    /// Parses `All` or a priority name, ignoring ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        Priority::parse(value).map(Self::Only)
    }
}

impl Display for PriorityFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(priority) => f.write_str(priority.as_str()),
        }
    }
}

/// Ordering applied to the visible task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortMode {
    /// Earliest due date first; tasks without a due date last.
    #[default]
    DueDate,
    /// Newest task first.
    CreatedAt,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DueDate => "due-date",
            Self::CreatedAt => "created-at",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "due-date" => Some(Self::DueDate),
            "created-at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

impl Display for SortMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search, filter and sort settings owned by the task store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewControls {
    pub search_query: String,
    pub filter_priority: PriorityFilter,
    pub sort_by: SortMode,
}

impl ViewControls {
    /// Case-insensitive title search plus priority filter.
    pub fn matches(&self, task: &Task) -> bool {
        let query = self.search_query.to_lowercase();
        task.title.to_lowercase().contains(&query) && self.filter_priority.matches(task.priority)
    }
}

/// Tasks passing the current search and filter, in display order.
pub fn visible_tasks<'a>(tasks: &'a [Task], view: &ViewControls) -> Vec<&'a Task> {
    let mut visible: Vec<&Task> = tasks.iter().filter(|task| view.matches(task)).collect();
    match view.sort_by {
        SortMode::DueDate => visible.sort_by(|a, b| compare_due_dates(a, b)),
        SortMode::CreatedAt => visible.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    visible
}

/// [`visible_tasks`] restricted to one board column.
pub fn visible_tasks_in<'a>(
    tasks: &'a [Task],
    view: &ViewControls,
    column: Column,
) -> Vec<&'a Task> {
    visible_tasks(tasks, view)
        .into_iter()
        .filter(|task| task.column == column)
        .collect()
}

/// Number of visible tasks per column, in board order.
pub fn column_counts(tasks: &[Task], view: &ViewControls) -> [(Column, usize); 3] {
    Column::ALL.map(|column| {
        let count = tasks
            .iter()
            .filter(|task| task.column == column && view.matches(task))
            .count();
        (column, count)
    })
}

fn compare_due_dates(a: &Task, b: &Task) -> Ordering {
    match (a.due_at(), b.due_at()) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
