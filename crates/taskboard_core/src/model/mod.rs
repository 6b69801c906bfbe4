//! Board domain model: tasks, activity log entries and auth sessions.
//!
//! # Responsibility
//! - Define the canonical records owned by the task and auth stores.
//! - Pin the JSON wire shape used by persisted storage keys.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` unique within a board.
//! - Activity entries are immutable snapshots and never reference back into
//!   live task state.
//! - `Session::is_authenticated()` is derived from the presence of a user.

pub mod activity;
pub mod session;
pub mod task;
pub mod timestamp;
