//! Task reducer and store.
//!
//! # Responsibility
//! - Apply task intents to the task collection and activity log.
//! - Persist tasks and log together after every applied mutation.
//! - Hold transient view controls (search, filter, sort).
//!
//! # Invariants
//! - Each applied mutating intent prepends exactly one log entry.
//! - Intents targeting an unknown id change nothing and log nothing.
//! - Log entries only disappear through `ResetBoard` or the configured cap.
//! - Task order is insertion order; updates and moves keep positions.

use crate::effects::{BoardEffects, SystemEffects};
use crate::model::activity::{ActivityAction, ActivityLogEntry};
use crate::model::task::{Column, Task, TaskDraft, TaskId, TaskUpdate, TaskValidationError};
use crate::storage::{StorageBackends, StorageKind, StorageResult, ACTIVITY_LOGS_KEY, TASKS_KEY};
use crate::store::subscription::{SubscriptionId, Subscribers};
use crate::store::view::{self, PriorityFilter, SortMode, ViewControls};
use crate::store::DispatchReport;
use log::{debug, info, warn};

/// Dispatchable task commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIntent {
    AddTask(TaskDraft),
    UpdateTask { id: TaskId, update: TaskUpdate },
    MoveTask { id: TaskId, column: Column },
    DeleteTask(TaskId),
    ResetBoard,
    SetSearchQuery(String),
    SetFilterPriority(PriorityFilter),
    SetSortBy(SortMode),
}

impl TaskIntent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddTask(_) => "add_task",
            Self::UpdateTask { .. } => "update_task",
            Self::MoveTask { .. } => "move_task",
            Self::DeleteTask(_) => "delete_task",
            Self::ResetBoard => "reset_board",
            Self::SetSearchQuery(_) => "set_search_query",
            Self::SetFilterPriority(_) => "set_filter_priority",
            Self::SetSortBy(_) => "set_sort_by",
        }
    }
}

/// What the reducer did with an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Added(TaskId),
    Updated(TaskId),
    Moved(TaskId),
    Deleted(TaskId),
    Reset,
    /// A view control changed; nothing to persist.
    ViewChanged,
    /// No task has this id; state is untouched.
    NotFound(TaskId),
    /// Payload failed validation; state is untouched.
    Rejected(TaskValidationError),
}

impl TaskOutcome {
    /// Whether tasks or log changed and must be written to storage.
    pub fn needs_persist(&self) -> bool {
        matches!(
            self,
            Self::Added(_) | Self::Updated(_) | Self::Moved(_) | Self::Deleted(_) | Self::Reset
        )
    }

    /// Whether any state, persisted or transient, changed.
    pub fn is_applied(&self) -> bool {
        self.needs_persist() || matches!(self, Self::ViewChanged)
    }
}

/// The task slice: collection, activity log and view controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    /// Newest first.
    pub logs: Vec<ActivityLogEntry>,
    pub view: ViewControls,
}

impl TaskState {
    pub fn new(tasks: Vec<Task>, logs: Vec<ActivityLogEntry>) -> Self {
        Self {
            tasks,
            logs,
            view: ViewControls::default(),
        }
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Applies one intent in place.
    ///
    /// `max_logs` truncates the oldest log entries after a prepend.
    pub fn apply(
        &mut self,
        intent: TaskIntent,
        effects: &mut dyn BoardEffects,
        max_logs: Option<usize>,
    ) -> TaskOutcome {
        let outcome = match intent {
            TaskIntent::AddTask(draft) => {
                if let Err(err) = draft.validate() {
                    return TaskOutcome::Rejected(err);
                }
                let task = Task::from_draft(effects.next_id(), effects.now(), draft);
                let id = task.id;
                self.tasks.push(task);
                self.record(self.tasks.len() - 1, ActivityAction::Created, effects);
                TaskOutcome::Added(id)
            }
            TaskIntent::UpdateTask { id, update } => {
                let Some(index) = self.position(id) else {
                    return TaskOutcome::NotFound(id);
                };
                if let Err(err) = update.validate() {
                    return TaskOutcome::Rejected(err);
                }
                self.tasks[index].apply_update(update);
                self.record(index, ActivityAction::Edited, effects);
                TaskOutcome::Updated(id)
            }
            TaskIntent::MoveTask { id, column } => {
                let Some(index) = self.position(id) else {
                    return TaskOutcome::NotFound(id);
                };
                self.tasks[index].column = column;
                self.record(index, ActivityAction::Moved, effects);
                TaskOutcome::Moved(id)
            }
            TaskIntent::DeleteTask(id) => {
                let Some(index) = self.position(id) else {
                    return TaskOutcome::NotFound(id);
                };
                // Snapshot the title before the task disappears.
                self.record(index, ActivityAction::Deleted, effects);
                self.tasks.remove(index);
                TaskOutcome::Deleted(id)
            }
            TaskIntent::ResetBoard => {
                self.tasks.clear();
                self.logs.clear();
                return TaskOutcome::Reset;
            }
            TaskIntent::SetSearchQuery(query) => {
                self.view.search_query = query;
                return TaskOutcome::ViewChanged;
            }
            TaskIntent::SetFilterPriority(filter) => {
                self.view.filter_priority = filter;
                return TaskOutcome::ViewChanged;
            }
            TaskIntent::SetSortBy(mode) => {
                self.view.sort_by = mode;
                return TaskOutcome::ViewChanged;
            }
        };

        if let Some(cap) = max_logs {
            self.logs.truncate(cap);
        }
        outcome
    }

    /// Tasks passing the current view controls, in display order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        view::visible_tasks(&self.tasks, &self.view)
    }

    pub fn visible_tasks_in(&self, column: Column) -> Vec<&Task> {
        view::visible_tasks_in(&self.tasks, &self.view, column)
    }

    pub fn column_counts(&self) -> [(Column, usize); 3] {
        view::column_counts(&self.tasks, &self.view)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn record(&mut self, index: usize, action: ActivityAction, effects: &mut dyn BoardEffects) {
        let entry = ActivityLogEntry::record(effects.next_id(), &self.tasks[index], action, effects.now());
        self.logs.insert(0, entry);
    }
}

/// Rebuilds tasks and log from durable storage; view controls start at
/// their defaults.
pub fn load_task_state(storage: &StorageBackends) -> TaskState {
    let tasks: Vec<Task> = storage
        .read_json(StorageKind::Durable, TASKS_KEY)
        .unwrap_or_default();
    let logs: Vec<ActivityLogEntry> = storage
        .read_json(StorageKind::Durable, ACTIVITY_LOGS_KEY)
        .unwrap_or_default();
    TaskState::new(tasks, logs)
}

/// Writes the full task collection and log to durable storage as one unit,
/// so a reload never sees tasks without their log entries.
pub fn persist_task_state(state: &TaskState, storage: &mut StorageBackends) -> StorageResult<()> {
    let tasks = serde_json::to_string(&state.tasks)?;
    let logs = serde_json::to_string(&state.logs)?;
    storage.set_many(
        StorageKind::Durable,
        &[(TASKS_KEY, tasks.as_str()), (ACTIVITY_LOGS_KEY, logs.as_str())],
    )
}

/// Owner of the task slice.
pub struct TaskStore<E: BoardEffects = SystemEffects> {
    state: TaskState,
    effects: E,
    max_activity_entries: Option<usize>,
    subscribers: Subscribers<TaskState>,
}

impl TaskStore<SystemEffects> {
    /// Seeds the store from durable storage using system ids and clock.
    pub fn load(storage: &StorageBackends) -> Self {
        Self::load_with(storage, SystemEffects)
    }
}

impl<E: BoardEffects> TaskStore<E> {
    pub fn load_with(storage: &StorageBackends, effects: E) -> Self {
        let state = load_task_state(storage);
        info!(
            "event=tasks_load module=store status=ok tasks={} logs={}",
            state.tasks.len(),
            state.logs.len()
        );
        Self::with_state(state, effects)
    }

    pub fn with_state(state: TaskState, effects: E) -> Self {
        Self {
            state,
            effects,
            max_activity_entries: None,
            subscribers: Subscribers::new(),
        }
    }

    /// Caps the activity log; `None` keeps it unbounded.
    pub fn with_max_activity_entries(mut self, cap: Option<usize>) -> Self {
        self.max_activity_entries = cap;
        self
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    /// Applies `intent`, persists applied mutations and notifies subscribers
    /// when anything changed.
    pub fn dispatch(
        &mut self,
        intent: TaskIntent,
        storage: &mut StorageBackends,
    ) -> DispatchReport<TaskOutcome> {
        let intent_name = intent.name();
        let outcome = self
            .state
            .apply(intent, &mut self.effects, self.max_activity_entries);

        let mut persist_error = None;
        if outcome.needs_persist() {
            if let Err(err) = persist_task_state(&self.state, storage) {
                warn!(
                    "event=task_dispatch module=store status=persist_failed intent={} error={}",
                    intent_name, err
                );
                persist_error = Some(err);
            }
        }

        match &outcome {
            TaskOutcome::NotFound(id) => debug!(
                "event=task_dispatch module=store status=ignored intent={} reason=not_found task_id={}",
                intent_name, id
            ),
            TaskOutcome::Rejected(err) => debug!(
                "event=task_dispatch module=store status=rejected intent={} reason={}",
                intent_name, err
            ),
            _ => debug!(
                "event=task_dispatch module=store status=ok intent={} tasks={} logs={}",
                intent_name,
                self.state.tasks.len(),
                self.state.logs.len()
            ),
        }

        if outcome.is_applied() {
            self.subscribers.notify(&self.state);
        }
        DispatchReport::new(outcome, persist_error)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&TaskState) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}
