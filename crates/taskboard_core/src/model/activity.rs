//! Activity log entries recorded for every task mutation.

use crate::model::task::{Task, TaskId};
use crate::model::timestamp::{iso_millis, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Kind of task mutation captured by an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Created,
    Edited,
    Moved,
    Deleted,
}

impl ActivityAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Edited => "edited",
            Self::Moved => "moved",
            Self::Deleted => "deleted",
        }
    }
}

impl Display for ActivityAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record persisted under the `activity_logs` key.
///
/// `task_title` is a snapshot taken when the action happened, so the entry
/// stays readable after the task itself is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub task_id: TaskId,
    pub task_title: String,
    pub action: ActivityAction,
    #[serde(with = "iso_millis")]
    pub timestamp: Timestamp,
}

impl ActivityLogEntry {
    /// Captures `action` against the current state of `task`.
    pub fn record(id: Uuid, task: &Task, action: ActivityAction, timestamp: Timestamp) -> Self {
        Self {
            id,
            task_id: task.id,
            task_title: task.title.clone(),
            action,
            timestamp,
        }
    }
}
