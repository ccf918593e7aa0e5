//! Saving and loading the InMemory backend.

use lexlist::{
    backend::{BackendImpl, database::InMemory},
    list::{List, ListConfig},
};
use tempfile::TempDir;

use crate::helpers::*;

#[tokio::test]
async fn save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lexlist.json");

    let backend = InMemory::new();
    let list = seeded_list(&backend).await;
    seed_entries(&backend, &list, &[("a", "b"), ("b", "n"), ("c", "z")]).await;
    backend.save_to_file(&path).await.unwrap();

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    assert_eq!(loaded.get_list(&list.id).await.unwrap(), list);
    assert_eq!(messages(&loaded, &list.id).await, ["a", "b", "c"]);
    assert_eq!(ranks(&loaded, &list.id).await, ["b", "n", "z"]);
}

#[tokio::test]
async fn loaded_backend_accepts_new_transactions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lexlist.json");

    let backend = InMemory::new();
    let list = seeded_list(&backend).await;
    backend.save_to_file(&path).await.unwrap();

    let store = lexlist::Store::open(
        Box::new(InMemory::load_from_file(&path).await.unwrap()),
        ListConfig::default(),
    );
    store
        .lists()
        .append(&list.id, &list.owner_id, "after reload")
        .await
        .unwrap();
    assert_eq!(
        messages(store.backend().as_ref(), &list.id).await,
        ["after reload"]
    );
}

#[tokio::test]
async fn missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let loaded = InMemory::load_from_file(dir.path().join("absent.json"))
        .await
        .unwrap();
    assert!(loaded.all_lists().await.unwrap().is_empty());
    assert!(loaded.all_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lexlist.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_io_error());
}

#[tokio::test]
async fn unknown_format_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lexlist.json");
    std::fs::write(&path, r#"{"_v": 9, "users": [], "lists": [], "entries": []}"#).unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_io_error());
}

#[tokio::test]
async fn empty_object_is_an_empty_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lexlist.json");
    std::fs::write(&path, "{}").unwrap();

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    let list = List::new(lexlist::UserId::generate(), "fresh", 0);
    loaded.put_list(list.clone()).await.unwrap();
    assert_eq!(loaded.all_lists().await.unwrap(), vec![list]);
}
