use std::cell::RefCell;
use std::rc::Rc;
use taskboard_core::storage::{REMEMBER_ME_KEY, USER_KEY};
use taskboard_core::{AuthIntent, AuthStore, Identity, Session, StorageBackends, StorageKind};

fn stored_user(storage: &StorageBackends, kind: StorageKind) -> Option<Identity> {
    storage.read_json(kind, USER_KEY)
}

#[test]
fn login_with_remember_me_writes_durable_user_only() {
    let mut storage = StorageBackends::in_memory();
    let mut store = AuthStore::load(&storage);

    let report = store.dispatch(AuthIntent::login("intern@demo.com", true), &mut storage);
    assert!(report.persisted());

    let session = store.session();
    assert!(session.is_authenticated());
    assert!(session.remember_me());
    assert_eq!(session.user().unwrap().email, "intern@demo.com");

    assert_eq!(
        storage.get(StorageKind::Durable, USER_KEY).as_deref(),
        Some(r#"{"email":"intern@demo.com"}"#)
    );
    assert!(stored_user(&storage, StorageKind::Session).is_none());
    assert_eq!(
        storage.get(StorageKind::Durable, REMEMBER_ME_KEY).as_deref(),
        Some("true")
    );
}

#[test]
fn login_without_remember_me_writes_session_user_only() {
    let mut storage = StorageBackends::in_memory();
    let mut store = AuthStore::load(&storage);

    store.dispatch(AuthIntent::login("intern@demo.com", false), &mut storage);

    assert!(store.session().is_authenticated());
    assert!(!store.session().remember_me());
    assert_eq!(
        stored_user(&storage, StorageKind::Session),
        Some(Identity::new("intern@demo.com"))
    );
    assert!(stored_user(&storage, StorageKind::Durable).is_none());
    assert_eq!(
        storage.get(StorageKind::Durable, REMEMBER_ME_KEY).as_deref(),
        Some("false")
    );
}

#[test]
fn relogin_moves_user_between_backends() {
    let mut storage = StorageBackends::in_memory();
    let mut store = AuthStore::load(&storage);

    store.dispatch(AuthIntent::login("intern@demo.com", true), &mut storage);
    store.dispatch(AuthIntent::login("intern@demo.com", false), &mut storage);

    assert!(stored_user(&storage, StorageKind::Durable).is_none());
    assert!(stored_user(&storage, StorageKind::Session).is_some());
}

#[test]
fn logout_resets_session_and_clears_all_keys() {
    let mut storage = StorageBackends::in_memory();
    let mut store = AuthStore::load(&storage);
    store.dispatch(AuthIntent::login("test@test.com", true), &mut storage);

    let report = store.dispatch(AuthIntent::Logout, &mut storage);
    assert!(report.persisted());

    assert_eq!(*store.session(), Session::anonymous());
    assert_eq!(storage.get(StorageKind::Durable, USER_KEY), None);
    assert_eq!(storage.get(StorageKind::Session, USER_KEY), None);
    assert_eq!(storage.get(StorageKind::Durable, REMEMBER_ME_KEY), None);
}

#[test]
fn remembered_session_survives_reload() {
    let mut storage = StorageBackends::in_memory();
    let mut store = AuthStore::load(&storage);
    store.dispatch(AuthIntent::login("intern@demo.com", true), &mut storage);

    let reloaded = AuthStore::load(&storage);
    assert_eq!(reloaded.session(), store.session());
}

#[test]
fn session_scoped_login_reloads_while_session_backend_lives() {
    let mut storage = StorageBackends::in_memory();
    let mut store = AuthStore::load(&storage);
    store.dispatch(AuthIntent::login("intern@demo.com", false), &mut storage);

    let reloaded = AuthStore::load(&storage);
    assert!(reloaded.session().is_authenticated());
    assert!(!reloaded.session().remember_me());
}

#[test]
fn detached_storage_loads_anonymous_and_reports_write_failure() {
    let mut storage = StorageBackends::detached();
    let mut store = AuthStore::load(&storage);
    assert_eq!(*store.session(), Session::anonymous());

    let report = store.dispatch(AuthIntent::login("intern@demo.com", true), &mut storage);
    assert!(!report.persisted());
    assert!(store.session().is_authenticated());
}

#[test]
fn malformed_stored_user_loads_anonymous() {
    let mut storage = StorageBackends::in_memory();
    storage
        .set(StorageKind::Durable, REMEMBER_ME_KEY, "true")
        .unwrap();
    storage
        .set(StorageKind::Durable, USER_KEY, "not-json")
        .unwrap();

    let store = AuthStore::load(&storage);
    assert_eq!(*store.session(), Session::anonymous());
}

#[test]
fn subscribers_see_every_transition() {
    let mut storage = StorageBackends::in_memory();
    let mut store = AuthStore::load(&storage);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    let id = store.subscribe(move |session: &Session| {
        sink.borrow_mut().push(session.is_authenticated());
    });

    store.dispatch(AuthIntent::login("intern@demo.com", false), &mut storage);
    store.dispatch(AuthIntent::Logout, &mut storage);
    assert!(store.unsubscribe(id));
    store.dispatch(AuthIntent::login("intern@demo.com", false), &mut storage);

    assert_eq!(*seen.borrow(), vec![true, false]);
}
