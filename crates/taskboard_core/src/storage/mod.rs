//! Key-value persistence backends for board state.
//!
//! # Responsibility
//! - Define the uniform `get`/`set`/`remove` contract shared by backends.
//! - Route reads and writes to the durable or session-scoped backend.
//! - Decode stored JSON leniently so corrupt values read as absent.
//!
//! # Invariants
//! - A missing backend never panics: reads yield `None`, removals are no-ops
//!   and writes report `StorageError::Unavailable`.
//! - Backend read failures are logged and surfaced as absent values.

use crate::db::DbError;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

mod memory_store;
mod sqlite_store;

pub use memory_store::MemoryStorage;
pub use sqlite_store::SqliteKvStorage;

/// Session identity, stored in the backend selected by remember-me.
pub const USER_KEY: &str = "user";
/// Remember-me flag, always stored in the durable backend.
pub const REMEMBER_ME_KEY: &str = "rememberMe";
/// Task collection, durable.
pub const TASKS_KEY: &str = "tasks";
/// Activity log, newest first, durable.
pub const ACTIVITY_LOGS_KEY: &str = "activity_logs";

pub type StorageResult<T> = Result<T, StorageError>;

/// Which of the two storage backends a value lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Survives restarts until explicitly cleared.
    Durable,
    /// Discarded when the current session ends.
    Session,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Session => "session",
        }
    }

    /// Backend holding the `user` key for the given remember-me flag.
    pub fn for_remember_me(remember_me: bool) -> Self {
        if remember_me {
            Self::Durable
        } else {
            Self::Session
        }
    }
}

/// Storage-layer error for backend access and value encoding.
#[derive(Debug)]
pub enum StorageError {
    /// The requested backend is not attached.
    Unavailable(StorageKind),
    Db(DbError),
    Encode(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(kind) => write!(f, "{} storage is unavailable", kind.as_str()),
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode stored value: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(_) => None,
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// String key-value store contract shared by all backends.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// Writes every entry or none of them.
    ///
    /// The default writes in order and, on the first failure, restores the
    /// keys already written to their previous values.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> StorageResult<()> {
        let mut previous = Vec::with_capacity(entries.len());
        for (key, _) in entries {
            previous.push((*key, self.get(key)?));
        }

        for (written, (key, value)) in entries.iter().enumerate() {
            if let Err(err) = self.set(key, value) {
                for (key, old) in previous.iter().take(written) {
                    let restored = match old {
                        Some(old) => self.set(key, old),
                        None => self.remove(key),
                    };
                    if let Err(restore_err) = restored {
                        warn!(
                            "event=storage_rollback module=storage status=error key={} error={}",
                            key, restore_err
                        );
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

/// The durable and session-scoped backends, either of which may be absent.
#[derive(Default)]
pub struct StorageBackends {
    durable: Option<Box<dyn KeyValueStorage>>,
    session: Option<Box<dyn KeyValueStorage>>,
}

impl StorageBackends {
    pub fn new(
        durable: Option<Box<dyn KeyValueStorage>>,
        session: Option<Box<dyn KeyValueStorage>>,
    ) -> Self {
        Self { durable, session }
    }

    /// No backing medium at all; every read yields defaults.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Both backends held in process memory.
    pub fn in_memory() -> Self {
        Self::new(
            Some(Box::new(MemoryStorage::new())),
            Some(Box::new(MemoryStorage::new())),
        )
    }

    /// SQLite file as durable backend plus a fresh in-memory session backend.
    pub fn open(database_path: &Path) -> StorageResult<Self> {
        let durable = SqliteKvStorage::open(database_path)?;
        Ok(Self::new(
            Some(Box::new(durable)),
            Some(Box::new(MemoryStorage::new())),
        ))
    }

    /// Reads a raw value; missing backends and read failures yield `None`.
    pub fn get(&self, kind: StorageKind, key: &str) -> Option<String> {
        let backend = self.backend(kind)?;
        match backend.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=storage_read module=storage status=error backend={} key={} error={}",
                    kind.as_str(),
                    key,
                    err
                );
                None
            }
        }
    }

    pub fn set(&mut self, kind: StorageKind, key: &str, value: &str) -> StorageResult<()> {
        match self.backend_mut(kind) {
            Some(backend) => backend.set(key, value),
            None => Err(StorageError::Unavailable(kind)),
        }
    }

    /// Writes all `entries` to one backend atomically.
    pub fn set_many(&mut self, kind: StorageKind, entries: &[(&str, &str)]) -> StorageResult<()> {
        match self.backend_mut(kind) {
            Some(backend) => backend.set_many(entries),
            None => Err(StorageError::Unavailable(kind)),
        }
    }

    /// Removes a key; removing from a missing backend is a no-op.
    pub fn remove(&mut self, kind: StorageKind, key: &str) -> StorageResult<()> {
        match self.backend_mut(kind) {
            Some(backend) => backend.remove(key),
            None => Ok(()),
        }
    }

    /// Reads and decodes a JSON value, treating malformed data as absent.
    pub fn read_json<T: DeserializeOwned>(&self, kind: StorageKind, key: &str) -> Option<T> {
        let raw = self.get(kind, key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    "event=storage_decode module=storage status=error backend={} key={} error={}",
                    kind.as_str(),
                    key,
                    err
                );
                None
            }
        }
    }

    pub fn write_json<T: Serialize + ?Sized>(
        &mut self,
        kind: StorageKind,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        let encoded = serde_json::to_string(value)?;
        self.set(kind, key, &encoded)
    }

    fn backend(&self, kind: StorageKind) -> Option<&dyn KeyValueStorage> {
        match kind {
            StorageKind::Durable => self.durable.as_deref(),
            StorageKind::Session => self.session.as_deref(),
        }
    }

    fn backend_mut(&mut self, kind: StorageKind) -> Option<&mut (dyn KeyValueStorage + 'static)> {
        match kind {
            StorageKind::Durable => self.durable.as_deref_mut(),
            StorageKind::Session => self.session.as_deref_mut(),
        }
    }
}
