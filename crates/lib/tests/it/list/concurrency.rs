//! Concurrent writers on one list.

use lexlist::list::ListConfig;

use crate::helpers::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_and_moves_keep_a_total_order() {
    let store = test_store().await;
    let list = seeded_list(store.backend().as_ref()).await;
    let lists = manager(&store, ListConfig::default());

    let mut ids = Vec::new();
    for i in 0..8 {
        let entry = lists
            .append(&list.id, &list.owner_id, &format!("seed-{i}"))
            .await
            .unwrap();
        ids.push(entry.id);
    }

    let mut tasks = Vec::new();
    for worker in 0..8usize {
        let lists = lists.clone();
        let list = list.clone();
        let ids = ids.clone();
        tasks.push(tokio::spawn(async move {
            for step in 0..10usize {
                if (worker + step) % 2 == 0 {
                    let message = format!("w{worker}-{step}");
                    retry_on_conflict(|| lists.append(&list.id, &list.owner_id, &message))
                        .await
                        .unwrap();
                } else {
                    let entry = ids[(worker * 3 + step) % ids.len()];
                    let target = ((worker + step) % 5) as i64;
                    retry_on_conflict(|| lists.move_to_index(&list.id, &entry, target))
                        .await
                        .unwrap();
                }
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let entries = store.backend().ordered_entries(&list.id).await.unwrap();
    assert_eq!(entries.len(), 8 + 8 * 5);
    assert!(
        entries.windows(2).all(|w| w[0].rank < w[1].rank),
        "ranks must stay strictly increasing"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn writers_on_different_lists_do_not_interfere() {
    let store = test_store().await;
    let first = seeded_list(store.backend().as_ref()).await;
    let second = seeded_list(store.backend().as_ref()).await;
    let lists = manager(&store, ListConfig::default());

    let spawn = |list: lexlist::list::List| {
        let lists = lists.clone();
        tokio::spawn(async move {
            for i in 0..20 {
                let message = format!("{i:02}");
                retry_on_conflict(|| lists.append(&list.id, &list.owner_id, &message))
                    .await
                    .unwrap();
            }
        })
    };
    let (a, b) = tokio::join!(spawn(first.clone()), spawn(second.clone()));
    a.unwrap();
    b.unwrap();

    let expected: Vec<String> = (0..20).map(|i| format!("{i:02}")).collect();
    assert_eq!(messages(store.backend().as_ref(), &first.id).await, expected);
    assert_eq!(messages(store.backend().as_ref(), &second.id).await, expected);
}
