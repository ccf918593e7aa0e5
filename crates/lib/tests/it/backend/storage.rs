//! Backend contract, run against whichever backend TEST_BACKEND selects.

use std::time::Duration;

use lexlist::{
    ListId, UserId,
    backend::BackendError,
    list::Entry,
    user::{Role, User},
};

use crate::helpers::*;

fn user(username: &str) -> User {
    User {
        id: UserId::generate(),
        username: username.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role: Role::User,
        created_at: 0,
    }
}

#[tokio::test]
async fn users_are_unique_by_name() {
    let backend = test_backend().await;
    let alice = user("alice");
    backend.put_user(alice.clone()).await.unwrap();

    assert_eq!(backend.get_user(&alice.id).await.unwrap(), alice);
    assert_eq!(
        backend.find_user_by_name("alice").await.unwrap(),
        Some(alice.clone())
    );
    assert_eq!(backend.find_user_by_name("bob").await.unwrap(), None);

    // Replacing the same user keeps working.
    let mut renamed = alice.clone();
    renamed.role = Role::Admin;
    backend.put_user(renamed.clone()).await.unwrap();
    assert_eq!(backend.get_user(&alice.id).await.unwrap().role, Role::Admin);

    let err = backend.put_user(user("alice")).await.unwrap_err();
    assert!(matches!(
        err,
        lexlist::Error::Backend(BackendError::DuplicateUsername { .. })
    ));
    assert_eq!(backend.all_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let backend = test_backend().await;
    assert!(backend.get_user(&UserId::generate()).await.unwrap_err().is_not_found());
    assert!(backend.get_list(&ListId::generate()).await.unwrap_err().is_not_found());
    assert!(
        backend
            .get_entry(&lexlist::EntryId::generate())
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(backend.begin(&ListId::generate()).await.err().unwrap().is_not_found());
    assert!(
        backend
            .delete_list(&ListId::generate())
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn committed_writes_become_visible() {
    let backend = test_backend().await;
    let list = seeded_list(backend.as_ref()).await;

    let mut txn = backend.begin(&list.id).await.unwrap();
    let mut entry = Entry::new(list.id, list.owner_id, "staged", 0);
    txn.save_entry(&entry).await.unwrap();
    // The transaction reads its own writes.
    assert_eq!(txn.load_ordered_entries().await.unwrap().len(), 1);
    txn.commit().await.unwrap();

    assert_eq!(backend.get_entry(&entry.id).await.unwrap(), entry);

    entry.message = "edited".to_string();
    let mut txn = backend.begin(&list.id).await.unwrap();
    txn.save_entry(&entry).await.unwrap();
    txn.commit().await.unwrap();
    assert_eq!(messages(backend.as_ref(), &list.id).await, ["edited"]);
}

#[tokio::test]
async fn rollback_and_drop_discard_writes() {
    let backend = test_backend().await;
    let list = seeded_list(backend.as_ref()).await;
    let kept = seed_entries(backend.as_ref(), &list, &[("kept", "n")]).await;

    let mut txn = backend.begin(&list.id).await.unwrap();
    txn.save_entry(&Entry::new(list.id, list.owner_id, "rolled back", 0))
        .await
        .unwrap();
    txn.delete_entry(&kept[0].id).await.unwrap();
    txn.rollback().await.unwrap();
    assert_eq!(messages(backend.as_ref(), &list.id).await, ["kept"]);

    {
        let mut txn = backend.begin(&list.id).await.unwrap();
        txn.save_entry(&Entry::new(list.id, list.owner_id, "dropped", 0))
            .await
            .unwrap();
    }
    assert_eq!(messages(backend.as_ref(), &list.id).await, ["kept"]);
}

#[tokio::test]
async fn entries_of_other_lists_are_refused() {
    let backend = test_backend().await;
    let list = seeded_list(backend.as_ref()).await;
    let other = seeded_list(backend.as_ref()).await;

    let mut txn = backend.begin(&list.id).await.unwrap();
    let err = txn
        .save_entry(&Entry::new(other.id, other.owner_id, "stray", 0))
        .await
        .unwrap_err();
    assert!(err.is_integrity_error());
    txn.rollback().await.unwrap();
}

#[tokio::test]
async fn a_second_transaction_waits_for_the_first() {
    let backend = test_backend().await;
    let list = seeded_list(backend.as_ref()).await;
    let other = seeded_list(backend.as_ref()).await;

    let txn = backend.begin(&list.id).await.unwrap();
    let blocked = tokio::time::timeout(Duration::from_millis(50), backend.begin(&list.id)).await;
    assert!(blocked.is_err(), "second begin should wait for the list lock");

    // Another list is not affected.
    let free = tokio::time::timeout(Duration::from_secs(5), backend.begin(&other.id))
        .await
        .expect("other list should not be blocked")
        .unwrap();
    free.rollback().await.unwrap();

    txn.commit().await.unwrap();
    let next = tokio::time::timeout(Duration::from_secs(5), backend.begin(&list.id))
        .await
        .expect("lock should be released after commit")
        .unwrap();
    next.rollback().await.unwrap();
}

#[tokio::test]
async fn delete_list_removes_its_entries() {
    let backend = test_backend().await;
    let list = seeded_list(backend.as_ref()).await;
    let other = seeded_list(backend.as_ref()).await;
    let doomed = seed_entries(backend.as_ref(), &list, &[("a", "b"), ("b", "z")]).await;
    seed_entries(backend.as_ref(), &other, &[("survivor", "n")]).await;

    backend.delete_list(&list.id).await.unwrap();

    assert!(backend.get_list(&list.id).await.unwrap_err().is_not_found());
    for entry in &doomed {
        assert!(backend.get_entry(&entry.id).await.unwrap_err().is_not_found());
    }
    let remaining = backend.all_entries().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].message, "survivor");
}

#[tokio::test]
async fn ordered_entries_sort_by_rank() {
    let backend = test_backend().await;
    let list = seeded_list(backend.as_ref()).await;
    seed_entries(
        backend.as_ref(),
        &list,
        &[("third", "t"), ("first", "b"), ("second", "bn"), ("fourth", "z")],
    )
    .await;

    assert_eq!(
        messages(backend.as_ref(), &list.id).await,
        ["first", "second", "third", "fourth"]
    );
}
