//! ListManager behaviour against the configured test backend.

use lexlist::{
    list::{ListConfig, ListError},
    rank::{Rank, midpoint},
};

use crate::helpers::*;

#[tokio::test]
async fn appends_fill_sentinels_then_shrink_tail() {
    let store = test_store().await;
    let backend = store.backend().as_ref();
    let list = seeded_list(backend).await;
    let lists = manager(&store, ListConfig::default());

    let first = lists.append(&list.id, &list.owner_id, "first").await.unwrap();
    assert_eq!(first.rank, "b");

    let second = lists.append(&list.id, &list.owner_id, "second").await.unwrap();
    assert_eq!(second.rank, "z");

    let third = lists.append(&list.id, &list.owner_id, "third").await.unwrap();
    assert_eq!(third.rank, "z");

    let ranks = ranks(backend, &list.id).await;
    assert_eq!(ranks[0], "b");
    assert!(ranks[0].as_str() < ranks[1].as_str() && ranks[1].as_str() < "z");
    assert_eq!(messages(backend, &list.id).await, ["first", "second", "third"]);
}

#[tokio::test]
async fn move_to_front_scenario() {
    let store = test_store().await;
    let backend = store.backend().as_ref();
    let list = seeded_list(backend).await;
    let seeded = seed_entries(backend, &list, &[("a", "b"), ("b", "m"), ("c", "z")]).await;
    let lists = manager(&store, ListConfig::default());

    let ordered = lists.move_to_index(&list.id, &seeded[2].id, 0).await.unwrap();

    let names: Vec<_> = ordered.iter().map(|e| e.entry.message.as_str()).collect();
    assert_eq!(names, ["c", "a", "b"]);
    let expected_a = midpoint(&Rank::first(), &Rank::parse("m").unwrap()).unwrap();
    assert_eq!(ordered[0].entry.rank, "b");
    assert_eq!(ordered[1].entry.rank, expected_a);
    assert_eq!(ordered[2].entry.rank, "m");
    assert_eq!(
        ordered.iter().map(|e| e.index).collect::<Vec<_>>(),
        [0, 1, 2]
    );

    // Persisted state matches what was returned.
    assert_eq!(messages(backend, &list.id).await, ["c", "a", "b"]);
}

#[tokio::test]
async fn move_targets_are_clamped() {
    let store = test_store().await;
    let backend = store.backend().as_ref();
    let list = seeded_list(backend).await;
    let lists = manager(&store, ListConfig::default());

    let mut ids = Vec::new();
    for message in ["a", "b", "c", "d"] {
        ids.push(lists.append(&list.id, &list.owner_id, message).await.unwrap().id);
    }

    lists.move_to_index(&list.id, &ids[0], 99).await.unwrap();
    assert_eq!(messages(backend, &list.id).await, ["b", "c", "d", "a"]);

    lists.move_to_index(&list.id, &ids[0], -5).await.unwrap();
    assert_eq!(messages(backend, &list.id).await, ["a", "b", "c", "d"]);

    lists.move_to_index(&list.id, &ids[3], 1).await.unwrap();
    assert_eq!(messages(backend, &list.id).await, ["a", "d", "b", "c"]);
}

#[tokio::test]
async fn insert_at_places_new_entries() {
    let store = test_store().await;
    let backend = store.backend().as_ref();
    let list = seeded_list(backend).await;
    let lists = manager(&store, ListConfig::default());

    lists.insert_at(&list.id, &list.owner_id, "only", 7).await.unwrap();
    lists.insert_at(&list.id, &list.owner_id, "front", 0).await.unwrap();
    lists.insert_at(&list.id, &list.owner_id, "middle", 1).await.unwrap();
    lists.insert_at(&list.id, &list.owner_id, "back", i64::MAX).await.unwrap();

    assert_eq!(
        messages(backend, &list.id).await,
        ["front", "middle", "only", "back"]
    );
}

#[tokio::test]
async fn long_runs_of_appends_stay_bounded() {
    let max_rank_length = 8;
    let store = test_store().await;
    let backend = store.backend().as_ref();
    let list = seeded_list(backend).await;
    let lists = manager(&store, ListConfig { max_rank_length });

    for i in 0..600 {
        lists
            .append(&list.id, &list.owner_id, &format!("{i:03}"))
            .await
            .unwrap();
    }

    let entries = backend.ordered_entries(&list.id).await.unwrap();
    assert_eq!(entries.len(), 600);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.message, format!("{i:03}"));
        assert!(
            entry.rank.len() <= max_rank_length,
            "rank {} of entry {i} is too long",
            entry.rank
        );
    }
    assert!(entries.windows(2).all(|w| w[0].rank < w[1].rank));
}

#[tokio::test]
async fn long_runs_of_appends_stay_bounded_at_the_default_limit() {
    let store = test_store().await;
    let backend = store.backend().as_ref();
    let list = seeded_list(backend).await;
    let lists = manager(&store, ListConfig::default());

    for i in 0..600 {
        lists
            .append(&list.id, &list.owner_id, &format!("{i:03}"))
            .await
            .unwrap();
    }

    let entries = backend.ordered_entries(&list.id).await.unwrap();
    assert_eq!(entries.len(), 600);
    assert!(
        entries
            .iter()
            .all(|e| e.rank.len() <= ListConfig::default().max_rank_length)
    );
    assert!(entries.windows(2).all(|w| w[0].rank < w[1].rank));
    assert_eq!(entries[599].message, "599");
}

#[tokio::test]
async fn edits_keep_position() {
    let store = test_store().await;
    let backend = store.backend().as_ref();
    let list = seeded_list(backend).await;
    let lists = manager(&store, ListConfig::default());

    let a = lists.append(&list.id, &list.owner_id, "a").await.unwrap();
    lists.append(&list.id, &list.owner_id, "b").await.unwrap();

    let toggled = lists.toggle(&list.id, &a.id).await.unwrap();
    assert!(!toggled.active);
    assert_eq!(toggled.rank, a.rank);

    let renamed = lists.update_message(&list.id, &a.id, "a2").await.unwrap();
    assert_eq!(renamed.rank, a.rank);
    assert!(!renamed.active);

    assert_eq!(messages(backend, &list.id).await, ["a2", "b"]);

    lists.remove(&list.id, &a.id).await.unwrap();
    assert_eq!(messages(backend, &list.id).await, ["b"]);
    assert!(backend.get_entry(&a.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn lone_survivor_on_last_sentinel_is_pulled_down() {
    let store = test_store().await;
    let backend = store.backend().as_ref();
    let list = seeded_list(backend).await;
    let lists = manager(&store, ListConfig::default());

    let a = lists.append(&list.id, &list.owner_id, "a").await.unwrap();
    let b = lists.append(&list.id, &list.owner_id, "b").await.unwrap();
    lists.remove(&list.id, &a.id).await.unwrap();

    // `b` still holds "z"; appending must not give a second "z".
    let c = lists.append(&list.id, &list.owner_id, "c").await.unwrap();
    assert_eq!(c.rank, "z");
    assert_eq!(backend.get_entry(&b.id).await.unwrap().rank, "b");
    assert_eq!(messages(backend, &list.id).await, ["b", "c"]);
}

#[tokio::test]
async fn collisions_block_placement_until_rebalanced() {
    let store = test_store().await;
    let backend = store.backend().as_ref();
    let list = seeded_list(backend).await;
    let seeded = seed_entries(backend, &list, &[("x", "m"), ("y", "m"), ("w", "b")]).await;
    let lists = manager(&store, ListConfig::default());

    let err = lists
        .append(&list.id, &list.owner_id, "new")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        lexlist::Error::List(ListError::RankCollision { .. })
    ));
    assert_eq!(messages(backend, &list.id).await.len(), 3);

    let ordered = lists.rebalance(&list.id).await.unwrap();
    assert_eq!(ordered[0].entry.id, seeded[2].id);
    assert!(
        ordered
            .windows(2)
            .all(|w| w[0].entry.rank < w[1].entry.rank)
    );

    lists.append(&list.id, &list.owner_id, "new").await.unwrap();
    assert_eq!(messages(backend, &list.id).await.len(), 4);
}

#[tokio::test]
async fn unknown_entries_and_lists() {
    let store = test_store().await;
    let backend = store.backend().as_ref();
    let list = seeded_list(backend).await;
    let other = seeded_list(backend).await;
    let lists = manager(&store, ListConfig::default());

    let entry = lists.append(&other.id, &other.owner_id, "elsewhere").await.unwrap();

    // An entry of another list is not in this one.
    let err = lists.move_to_index(&list.id, &entry.id, 0).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(
        err,
        lexlist::Error::List(ListError::EntryNotInList { .. })
    ));

    let missing = lexlist::ListId::generate();
    let err = lists.append(&missing, &list.owner_id, "x").await.unwrap_err();
    assert!(err.is_not_found());
    let err = lists.ordered_entries(&missing).await.unwrap_err();
    assert!(err.is_not_found());
}
