//! Per-caller visibility of lists and entries.

use lexlist::user::Role;

use crate::helpers::*;

#[tokio::test]
async fn owners_see_only_their_rows() {
    let store = test_store().await;
    let alice = user_scope(&store, "alice", Role::User).await;
    let bob = user_scope(&store, "bob", Role::User).await;

    let groceries = alice.create_list("groceries").await.unwrap();
    let milk = alice.create_entry(&groceries.id, "milk", None).await.unwrap();
    let chores = bob.create_list("chores").await.unwrap();
    bob.create_entry(&chores.id, "dishes", None).await.unwrap();

    assert_eq!(alice.lists().await.unwrap(), vec![groceries.clone()]);
    assert_eq!(alice.entries().await.unwrap(), vec![milk.clone()]);

    // Foreign rows look missing rather than forbidden.
    assert!(bob.get_list(&groceries.id).await.unwrap_err().is_not_found());
    assert!(bob.get_entry(&milk.id).await.unwrap_err().is_not_found());
    assert!(bob.toggle_entry(&milk.id).await.unwrap_err().is_not_found());
    assert!(
        bob.create_entry(&groceries.id, "sneaky", None)
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(bob.delete_list(&groceries.id).await.unwrap_err().is_not_found());
    assert_eq!(alice.get_list(&groceries.id).await.unwrap().entries.len(), 1);
}

#[tokio::test]
async fn admins_see_everything() {
    let store = test_store().await;
    let alice = user_scope(&store, "alice", Role::User).await;
    let admin = user_scope(&store, "admin", Role::Admin).await;

    let list = alice.create_list("groceries").await.unwrap();
    let entry = alice.create_entry(&list.id, "milk", None).await.unwrap();

    assert_eq!(admin.lists().await.unwrap().len(), 1);
    let toggled = admin.toggle_entry(&entry.id).await.unwrap();
    assert!(!toggled.active);
    assert!(!alice.get_entry(&entry.id).await.unwrap().active);
}

#[tokio::test]
async fn owner_controls_entries_an_admin_added() {
    let store = test_store().await;
    let alice = user_scope(&store, "alice", Role::User).await;
    let admin = user_scope(&store, "admin", Role::Admin).await;

    let list = alice.create_list("groceries").await.unwrap();
    alice.create_entry(&list.id, "milk", None).await.unwrap();
    let bread = admin.create_entry(&list.id, "bread", Some(0)).await.unwrap();

    let view = alice.get_list(&list.id).await.unwrap();
    assert_eq!(view.entries[0].entry.id, bread.id);
    assert_eq!(alice.entries().await.unwrap().len(), 2);

    let toggled = alice.toggle_entry(&bread.id).await.unwrap();
    assert!(!toggled.active);
    let edited = alice.update_entry(&bread.id, "rye bread").await.unwrap();
    assert_eq!(edited.message, "rye bread");
    alice.reorder(&list.id, &bread.id, 1).await.unwrap();
    alice.delete_entry(&bread.id).await.unwrap();

    assert_eq!(messages(store.backend().as_ref(), &list.id).await, ["milk"]);
}

#[tokio::test]
async fn list_view_reflects_reorders() {
    let store = test_store().await;
    let alice = user_scope(&store, "alice", Role::User).await;
    let list = alice.create_list("  trip  ").await.unwrap();
    assert_eq!(list.name, "trip");

    let mut ids = Vec::new();
    for message in ["tickets", "passport", "charger"] {
        ids.push(alice.create_entry(&list.id, message, None).await.unwrap().id);
    }
    alice.reorder(&list.id, &ids[2], 0).await.unwrap();
    alice.create_entry(&list.id, "snacks", Some(1)).await.unwrap();

    let view = alice.get_list(&list.id).await.unwrap();
    let order: Vec<_> = view
        .entries
        .iter()
        .map(|e| e.entry.message.as_str())
        .collect();
    assert_eq!(order, ["charger", "snacks", "tickets", "passport"]);
    assert_eq!(view.entries[3].index, 3);

    let renamed = alice.rename_list(&list.id, "holiday").await.unwrap();
    assert_eq!(renamed.name, "holiday");
    assert!(alice.rename_list(&list.id, "   ").await.unwrap_err().is_validation_error());

    alice.delete_list(&list.id).await.unwrap();
    assert!(alice.entries().await.unwrap().is_empty());
    assert!(alice.get_entry(&ids[0]).await.unwrap_err().is_not_found());
}
