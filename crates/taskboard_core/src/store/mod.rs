//! State containers for auth and task slices.
//!
//! # Responsibility
//! - Run intents through pure reducers, then persist and notify.
//! - Keep the two slices independent: neither store touches the other.
//!
//! # Invariants
//! - Every intent completes its transition and storage write before the
//!   next one is accepted (`&mut self` dispatch).
//! - Persistence is best-effort: a failed write never rolls back or
//!   corrupts in-memory state.

use crate::storage::StorageError;

pub mod auth;
pub mod subscription;
pub mod tasks;
pub mod view;

/// Result of dispatching one intent.
#[derive(Debug)]
pub struct DispatchReport<O = ()> {
    /// Reducer outcome for the intent.
    pub outcome: O,
    /// Storage failure from the persistence step, if any.
    pub persist_error: Option<StorageError>,
}

impl<O> DispatchReport<O> {
    pub(crate) fn new(outcome: O, persist_error: Option<StorageError>) -> Self {
        Self {
            outcome,
            persist_error,
        }
    }

    pub fn persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}
