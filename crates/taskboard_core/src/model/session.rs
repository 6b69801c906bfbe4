//! Auth session model.
//!
//! # Invariants
//! - A session is authenticated exactly when it carries an identity.
//! - The anonymous session never carries `remember_me = true`.

use serde::{Deserialize, Serialize};

/// Signed-in user identity, persisted under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
}

impl Identity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Current auth state held by the auth store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<Identity>,
    remember_me: bool,
}

impl Session {
    /// Signed-out session: no user, not authenticated, not remembered.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(identity: Identity, remember_me: bool) -> Self {
        Self {
            user: Some(identity),
            remember_me,
        }
    }

    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn remember_me(&self) -> bool {
        self.remember_me
    }
}

#[cfg(test)]
mod tests {
    use super::{Identity, Session};

    #[test]
    fn anonymous_session_is_not_authenticated() {
        let session = Session::anonymous();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(!session.remember_me());
    }

    #[test]
    fn signed_in_session_is_authenticated() {
        let session = Session::signed_in(Identity::new("a@b.co"), true);
        assert!(session.is_authenticated());
        assert_eq!(session.user().map(|user| user.email.as_str()), Some("a@b.co"));
        assert!(session.remember_me());
    }

    #[test]
    fn identity_wire_shape_is_email_only() {
        let json = serde_json::to_string(&Identity::new("intern@demo.com")).unwrap();
        assert_eq!(json, r#"{"email":"intern@demo.com"}"#);
    }
}
