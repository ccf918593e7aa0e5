//! Registration, login and account updates through the Store.

use lexlist::{UserUpdate, user::Role};

use crate::helpers::*;

#[tokio::test]
async fn register_then_login() {
    let store = test_store().await;
    let user = store
        .create_user("alice", "correct horse", Role::User)
        .await
        .unwrap();
    assert_ne!(user.password_hash, "correct horse");

    let logged_in = store.authenticate("alice", "correct horse").await.unwrap();
    assert_eq!(logged_in.id, user.id);

    let wrong = store.authenticate("alice", "battery staple").await.unwrap_err();
    assert!(wrong.is_authentication_error());
    let unknown = store.authenticate("mallory", "correct horse").await.unwrap_err();
    assert!(unknown.is_authentication_error());
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn registration_validates_input() {
    let store = test_store().await;
    for username in ["", "has space", "semi;colon"] {
        let err = store
            .create_user(username, "long enough", Role::User)
            .await
            .unwrap_err();
        assert!(err.is_validation_error(), "{username:?} should be rejected");
    }
    let err = store.create_user("bob", "abc", Role::User).await.unwrap_err();
    assert!(err.is_validation_error());

    store.create_user("bob", "long enough", Role::User).await.unwrap();
    let err = store
        .create_user("bob", "different password", Role::User)
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn ensure_admin_is_idempotent() {
    let store = test_store().await;
    let first = store.ensure_admin("root", "admin-password").await.unwrap();
    assert_eq!(first.role, Role::Admin);

    let second = store.ensure_admin("root", "other-password").await.unwrap();
    assert_eq!(second.id, first.id);
    // The original password still works.
    store.authenticate("root", "admin-password").await.unwrap();
}

#[tokio::test]
async fn password_and_role_changes() {
    let store = test_store().await;
    let alice = store.create_user("alice", "alice-password", Role::User).await.unwrap();
    let admin = store.create_user("admin", "admin-password", Role::Admin).await.unwrap();

    store
        .update_user(
            &alice.caller(),
            &alice.id,
            UserUpdate {
                password: Some("new-alice-password".into()),
                role: None,
            },
        )
        .await
        .unwrap();
    store.authenticate("alice", "new-alice-password").await.unwrap();
    assert!(store.authenticate("alice", "alice-password").await.is_err());

    // Promoting yourself is not allowed.
    let err = store
        .update_user(
            &alice.caller(),
            &alice.id,
            UserUpdate {
                password: None,
                role: Some(Role::Admin),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());

    let promoted = store
        .update_user(
            &admin.caller(),
            &alice.id,
            UserUpdate {
                password: None,
                role: Some(Role::Admin),
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);
    assert!(store.caller_for(&alice.id).await.unwrap().is_admin());

    // Admins still cannot set someone else's password.
    let err = store
        .update_user(
            &admin.caller(),
            &alice.id,
            UserUpdate {
                password: Some("hijacked-password".into()),
                role: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());
}

#[tokio::test]
async fn users_cannot_see_each_other() {
    let store = test_store().await;
    let alice = store.create_user("alice", "alice-password", Role::User).await.unwrap();
    let bob = store.create_user("bob", "bob-password", Role::User).await.unwrap();

    let err = store
        .update_user(&alice.caller(), &bob.id, UserUpdate::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
