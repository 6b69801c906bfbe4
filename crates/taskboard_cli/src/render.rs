//! Plain-text rendering of board state.

use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table};
use std::fmt::Write;
use taskboard_core::{ActivityLogEntry, Column, PriorityFilter, Task, TaskId, TaskState};

const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: TaskId) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

/// One table per column, each headed by its visible count.
pub fn board(state: &TaskState, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let view = &state.view;
    let filter = match view.filter_priority {
        PriorityFilter::All => "All".to_string(),
        PriorityFilter::Only(priority) => priority.to_string(),
    };
    let _ = writeln!(
        out,
        "search: {:?}  priority: {filter}  sort: {}",
        view.search_query,
        view.sort_by.as_str()
    );

    for (column, count) in state.column_counts() {
        let _ = writeln!(out, "\n{column} ({count})");
        if count == 0 {
            continue;
        }
        let _ = writeln!(out, "{}", column_table(state, column, now));
    }
    out
}

fn column_table(state: &TaskState, column: Column, now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["id", "title", "priority", "due", "tags"]);
    for task in state.visible_tasks_in(column) {
        table.add_row(vec![
            short_id(task.id),
            task.title.clone(),
            task.priority.to_string(),
            due_cell(task, now),
            task.tags.join(", "),
        ]);
    }
    table
}

fn due_cell(task: &Task, now: DateTime<Utc>) -> String {
    let due = task.due_date.clone().unwrap_or_default();
    if task.is_overdue(now) {
        format!("{due} (overdue)")
    } else {
        due
    }
}

/// The newest `limit` entries; `logs` is already newest first.
pub fn activity(logs: &[ActivityLogEntry], limit: usize, now: DateTime<Utc>) -> String {
    if logs.is_empty() {
        return "no activity yet\n".to_string();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["when", "action", "task", "title"]);
    for entry in logs.iter().take(limit) {
        table.add_row(vec![
            relative_age(entry.timestamp, now),
            entry.action.to_string(),
            short_id(entry.task_id),
            entry.task_title.clone(),
        ]);
    }
    format!("{table}\n")
}

/// Coarse age such as `5 min ago`; future instants read as `just now`.
fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} min ago");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours} h ago");
    }
    match elapsed.num_days() {
        1 => "1 day ago".to_string(),
        days => format!("{days} days ago"),
    }
}
