//! Auth reducer and store.
//!
//! # Responsibility
//! - Compute the next `Session` for `login`/`logout` intents.
//! - Persist the session to the backend selected by remember-me.
//! - Rebuild the session from storage at startup.
//!
//! # Invariants
//! - After login the `user` key exists in exactly one backend.
//! - The `rememberMe` flag always lives in the durable backend.
//! - Startup never fails: unreadable state yields an anonymous session.
//! - Credentials are checked before dispatch, never by the reducer.

use crate::model::session::{Identity, Session};
use crate::storage::{
    StorageBackends, StorageError, StorageKind, StorageResult, REMEMBER_ME_KEY, USER_KEY,
};
use crate::store::subscription::{SubscriptionId, Subscribers};
use crate::store::DispatchReport;
use log::{info, warn};

/// Dispatchable auth commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthIntent {
    Login { email: String, remember_me: bool },
    Logout,
}

impl AuthIntent {
    pub fn login(email: impl Into<String>, remember_me: bool) -> Self {
        Self::Login {
            email: email.into(),
            remember_me,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
        }
    }
}

/// Pure session transition.
pub fn reduce_auth(_current: &Session, intent: &AuthIntent) -> Session {
    match intent {
        AuthIntent::Login { email, remember_me } => {
            Session::signed_in(Identity::new(email.as_str()), *remember_me)
        }
        AuthIntent::Logout => Session::anonymous(),
    }
}

/// Writes the storage side effects of `intent`.
///
/// Every step is attempted even when an earlier one fails; the first error
/// is returned.
pub fn persist_auth(intent: &AuthIntent, storage: &mut StorageBackends) -> StorageResult<()> {
    let mut first_error: Option<StorageError> = None;
    let mut record = |result: StorageResult<()>| {
        if let Err(err) = result {
            first_error.get_or_insert(err);
        }
    };

    record(storage.remove(StorageKind::Durable, USER_KEY));
    record(storage.remove(StorageKind::Session, USER_KEY));

    match intent {
        AuthIntent::Login { email, remember_me } => {
            let target = StorageKind::for_remember_me(*remember_me);
            record(storage.write_json(target, USER_KEY, &Identity::new(email.as_str())));
            record(storage.set(
                StorageKind::Durable,
                REMEMBER_ME_KEY,
                if *remember_me { "true" } else { "false" },
            ));
        }
        AuthIntent::Logout => {
            record(storage.remove(StorageKind::Durable, REMEMBER_ME_KEY));
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Rebuilds the session from persisted storage.
pub fn load_session(storage: &StorageBackends) -> Session {
    let remember_me = storage
        .get(StorageKind::Durable, REMEMBER_ME_KEY)
        .is_some_and(|flag| flag == "true");
    let backend = StorageKind::for_remember_me(remember_me);

    match storage.read_json::<Identity>(backend, USER_KEY) {
        Some(identity) => Session::signed_in(identity, remember_me),
        // Flag without a user is stale; report the anonymous triple.
        None => Session::anonymous(),
    }
}

/// Owner of the auth slice.
#[derive(Debug, Default)]
pub struct AuthStore {
    session: Session,
    subscribers: Subscribers<Session>,
}

impl AuthStore {
    /// Seeds the store from persisted storage.
    pub fn load(storage: &StorageBackends) -> Self {
        let session = load_session(storage);
        info!(
            "event=auth_load module=store status=ok authenticated={} remember_me={}",
            session.is_authenticated(),
            session.remember_me()
        );
        Self::with_session(session)
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session,
            subscribers: Subscribers::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Applies `intent`, persists it best-effort and notifies subscribers.
    pub fn dispatch(&mut self, intent: AuthIntent, storage: &mut StorageBackends) -> DispatchReport {
        self.session = reduce_auth(&self.session, &intent);

        let persist_error = persist_auth(&intent, storage).err();
        match &persist_error {
            None => info!(
                "event=auth_dispatch module=store status=ok intent={} remember_me={}",
                intent.name(),
                self.session.remember_me()
            ),
            Some(err) => warn!(
                "event=auth_dispatch module=store status=persist_failed intent={} error={}",
                intent.name(),
                err
            ),
        }

        self.subscribers.notify(&self.session);
        DispatchReport::new((), persist_error)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Session) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{load_session, reduce_auth, AuthIntent};
    use crate::model::session::{Identity, Session};
    use crate::storage::{StorageBackends, StorageKind, REMEMBER_ME_KEY, USER_KEY};

    #[test]
    fn login_then_logout_transitions() {
        let signed_in = reduce_auth(
            &Session::anonymous(),
            &AuthIntent::login("intern@demo.com", false),
        );
        assert!(signed_in.is_authenticated());
        assert!(!signed_in.remember_me());

        let signed_out = reduce_auth(&signed_in, &AuthIntent::Logout);
        assert_eq!(signed_out, Session::anonymous());
    }

    #[test]
    fn load_session_reads_durable_user_when_remembered() {
        let mut storage = StorageBackends::in_memory();
        storage
            .set(StorageKind::Durable, REMEMBER_ME_KEY, "true")
            .unwrap();
        storage
            .write_json(StorageKind::Durable, USER_KEY, &Identity::new("a@b.co"))
            .unwrap();

        let session = load_session(&storage);
        assert!(session.is_authenticated());
        assert!(session.remember_me());
    }

    #[test]
    fn load_session_ignores_durable_user_when_flag_missing() {
        let mut storage = StorageBackends::in_memory();
        storage
            .write_json(StorageKind::Durable, USER_KEY, &Identity::new("a@b.co"))
            .unwrap();

        assert_eq!(load_session(&storage), Session::anonymous());
    }

    #[test]
    fn load_session_treats_malformed_user_as_absent() {
        let mut storage = StorageBackends::in_memory();
        storage
            .set(StorageKind::Session, USER_KEY, "{\"email\":")
            .unwrap();

        assert_eq!(load_session(&storage), Session::anonymous());
    }
}
