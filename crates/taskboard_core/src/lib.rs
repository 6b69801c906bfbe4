//! Core state layer for the taskboard kanban app.
//! This crate owns the auth/task reducers and their persistence contract.

pub mod config;
pub mod db;
pub mod effects;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod store;

pub use config::{BoardConfig, ConfigError};
pub use effects::{BoardEffects, FixedEffects, SystemEffects};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::activity::{ActivityAction, ActivityLogEntry};
pub use model::session::{Identity, Session};
pub use model::task::{Column, Priority, Task, TaskDraft, TaskId, TaskUpdate, TaskValidationError};
pub use service::board::{Board, BoardError};
pub use service::credentials::{check_credentials, CredentialError};
pub use storage::{
    KeyValueStorage, MemoryStorage, SqliteKvStorage, StorageBackends, StorageError, StorageKind,
};
pub use store::auth::{AuthIntent, AuthStore};
pub use store::subscription::SubscriptionId;
pub use store::tasks::{TaskIntent, TaskOutcome, TaskState, TaskStore};
pub use store::view::{PriorityFilter, SortMode, ViewControls};
pub use store::DispatchReport;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
