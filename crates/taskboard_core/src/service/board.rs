//! Board facade owning storage and both stores.
//!
//! # Responsibility
//! - Open storage backends and seed both stores from them.
//! - Route login through the credential gate before dispatch.
//! - Expose the protected-board check used by view layers.
//!
//! # Invariants
//! - The board is created explicitly and passed to callers; there is no
//!   process-global store.
//! - Auth and task stores never read or write each other's slice.

use crate::config::BoardConfig;
use crate::effects::{BoardEffects, SystemEffects};
use crate::model::session::{Identity, Session};
use crate::service::credentials::{check_credentials, CredentialError};
use crate::storage::{StorageBackends, StorageError};
use crate::store::auth::{AuthIntent, AuthStore};
use crate::store::tasks::{TaskIntent, TaskOutcome, TaskState, TaskStore};
use crate::store::subscription::SubscriptionId;
use crate::store::DispatchReport;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum BoardError {
    Storage(StorageError),
    Credentials(CredentialError),
    /// A board operation was attempted without a signed-in session.
    NotAuthenticated,
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Credentials(err) => write!(f, "{err}"),
            Self::NotAuthenticated => write!(f, "not signed in; run `login` first"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Credentials(err) => Some(err),
            Self::NotAuthenticated => None,
        }
    }
}

impl From<StorageError> for BoardError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<CredentialError> for BoardError {
    fn from(value: CredentialError) -> Self {
        Self::Credentials(value)
    }
}

/// Injected store handle for view layers.
pub struct Board<E: BoardEffects = SystemEffects> {
    storage: StorageBackends,
    auth: AuthStore,
    tasks: TaskStore<E>,
}

impl Board<SystemEffects> {
    /// Opens the durable database under `config.data_dir` with a fresh
    /// session backend.
    pub fn open(config: &BoardConfig) -> Result<Self, BoardError> {
        let storage = StorageBackends::open(&config.database_path())?;
        info!(
            "event=board_open module=service status=ok max_activity_entries={:?}",
            config.max_activity_entries
        );
        Ok(Self::with_storage(storage, SystemEffects)
            .with_max_activity_entries(config.max_activity_entries))
    }
}

impl<E: BoardEffects> Board<E> {
    /// Seeds both stores from `storage`.
    pub fn with_storage(storage: StorageBackends, effects: E) -> Self {
        let auth = AuthStore::load(&storage);
        let tasks = TaskStore::load_with(&storage, effects);
        Self {
            storage,
            auth,
            tasks,
        }
    }

    pub fn with_max_activity_entries(mut self, cap: Option<usize>) -> Self {
        self.tasks = self.tasks.with_max_activity_entries(cap);
        self
    }

    pub fn session(&self) -> &Session {
        self.auth.session()
    }

    pub fn task_state(&self) -> &TaskState {
        self.tasks.state()
    }

    pub fn subscribe_session<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Session) + 'static,
    {
        self.auth.subscribe(listener)
    }

    pub fn subscribe_tasks<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&TaskState) + 'static,
    {
        self.tasks.subscribe(listener)
    }

    /// Drops a listener from whichever store registered it.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.auth.unsubscribe(id) || self.tasks.unsubscribe(id)
    }

    /// Checks demo credentials, then dispatches `login`.
    pub fn login(
        &mut self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<DispatchReport, BoardError> {
        if let Err(err) = check_credentials(email, password) {
            warn!("event=login module=service status=rejected reason={err}");
            return Err(err.into());
        }
        Ok(self.dispatch_auth(AuthIntent::login(email.trim(), remember_me)))
    }

    pub fn logout(&mut self) -> DispatchReport {
        self.dispatch_auth(AuthIntent::Logout)
    }

    pub fn dispatch_auth(&mut self, intent: AuthIntent) -> DispatchReport {
        self.auth.dispatch(intent, &mut self.storage)
    }

    pub fn dispatch_task(&mut self, intent: TaskIntent) -> DispatchReport<TaskOutcome> {
        self.tasks.dispatch(intent, &mut self.storage)
    }

    /// Identity of the signed-in user, or `NotAuthenticated`.
    pub fn require_session(&self) -> Result<&Identity, BoardError> {
        self.auth.session().user().ok_or(BoardError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::{Board, BoardError};
    use crate::effects::SystemEffects;
    use crate::model::task::TaskDraft;
    use crate::service::credentials::{CredentialError, DEMO_EMAIL, DEMO_PASSWORD};
    use crate::storage::StorageBackends;
    use crate::store::tasks::TaskIntent;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn login_requires_demo_credentials() {
        let mut board = Board::with_storage(StorageBackends::in_memory(), SystemEffects);

        let err = board.login(DEMO_EMAIL, "wrong", false).unwrap_err();
        assert!(matches!(
            err,
            BoardError::Credentials(CredentialError::Mismatch)
        ));
        assert!(matches!(
            board.require_session(),
            Err(BoardError::NotAuthenticated)
        ));

        board.login(DEMO_EMAIL, DEMO_PASSWORD, false).unwrap();
        assert_eq!(board.require_session().unwrap().email, DEMO_EMAIL);
    }

    #[test]
    fn board_subscriptions_follow_their_store() {
        let mut board = Board::with_storage(StorageBackends::in_memory(), SystemEffects);
        let events = Rc::new(RefCell::new(Vec::new()));

        let session_events = Rc::clone(&events);
        let session_id = board.subscribe_session(move |session| {
            session_events
                .borrow_mut()
                .push(format!("auth:{}", session.is_authenticated()))
        });
        let task_events = Rc::clone(&events);
        board.subscribe_tasks(move |state| {
            task_events
                .borrow_mut()
                .push(format!("tasks:{}", state.tasks.len()))
        });

        board.login(DEMO_EMAIL, DEMO_PASSWORD, false).unwrap();
        board.dispatch_task(TaskIntent::AddTask(TaskDraft::new("watched")));
        assert!(board.unsubscribe(session_id));
        assert!(!board.unsubscribe(session_id));
        board.logout();

        assert_eq!(*events.borrow(), vec!["auth:true", "tasks:1"]);
    }
}
