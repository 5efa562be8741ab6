mod common;

use std::sync::Arc;

use common::{done, ids, pending, FlakyStore};
use mci_core::api::{
    InMemoryTaskStore, StoreError, StoreTaskFinder, Task, TaskFinder, TaskStatus, TaskStore,
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn returns_only_tasks_with_met_dependencies_in_store_order() {
    let store = Arc::new(InMemoryTaskStore::new(vec![
        done("compile"),
        Task::new("flaky-build").with_status(TaskStatus::Failed),
        pending("unit-test", &["compile"]),
        pending("package", &["compile", "flaky-build"]),
        pending("lint", &[]),
        pending("deploy", &["package"]),
        pending("docs", &["never-existed"]),
    ]));

    let finder = StoreTaskFinder::new(store);
    let runnable = finder.find_runnable_tasks().await.unwrap();

    assert_eq!(ids(&runnable), vec!["unit-test", "lint"]);
}

#[tokio::test]
async fn shared_dependency_is_fetched_once_per_scan() {
    let store = Arc::new(InMemoryTaskStore::new(vec![
        done("compile"),
        pending("a", &["compile"]),
        pending("b", &["compile"]),
        pending("c", &["compile", "ghost"]),
        pending("d", &["ghost"]),
    ]));

    let finder = StoreTaskFinder::new(store.clone());
    let runnable = finder.find_runnable_tasks().await.unwrap();
    assert_eq!(ids(&runnable), vec!["a", "b"]);

    let lookups = store.lookups();
    assert_eq!(lookups.iter().filter(|id| *id == "compile").count(), 1);
    assert_eq!(lookups.iter().filter(|id| *id == "ghost").count(), 1);

    // A second scan starts with a fresh cache.
    finder.find_runnable_tasks().await.unwrap();
    let lookups = store.lookups();
    assert_eq!(lookups.iter().filter(|id| *id == "compile").count(), 2);
}

#[tokio::test]
async fn one_failing_dependency_check_does_not_block_others() {
    let store = FlakyStore::new(vec![
        done("compile"),
        done("broken-dep"),
        pending("A", &["compile"]),
        pending("B", &["broken-dep"]),
        pending("C", &[]),
    ])
    .poison("broken-dep");

    let finder = StoreTaskFinder::new(Arc::new(store));
    let runnable = finder.find_runnable_tasks().await.unwrap();

    assert_eq!(ids(&runnable), vec!["A", "C"]);
}

#[tokio::test]
async fn listing_failure_is_fatal() {
    let store = FlakyStore::new(vec![pending("A", &[])]).failing_listing();
    let finder = StoreTaskFinder::new(Arc::new(store));

    let err = finder.find_runnable_tasks().await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}

#[tokio::test]
async fn cyclic_tasks_starve_without_affecting_others() {
    let store = Arc::new(InMemoryTaskStore::new(vec![
        pending("x", &["y"]),
        pending("y", &["x"]),
        pending("free", &[]),
    ]));

    for detect in [true, false] {
        let finder = StoreTaskFinder::new(store.clone()).with_cycle_detection(detect);
        let runnable = finder.find_runnable_tasks().await.unwrap();
        assert_eq!(ids(&runnable), vec!["free"]);
    }
}

#[tokio::test]
async fn result_tracks_store_changes_between_scans() {
    let store = Arc::new(InMemoryTaskStore::new(vec![
        Task::new("compile").with_status(TaskStatus::Started),
        pending("test", &["compile"]),
    ]));
    let finder = StoreTaskFinder::new(store.clone());

    assert!(finder.find_runnable_tasks().await.unwrap().is_empty());

    store.set_status("compile", TaskStatus::Success);
    let runnable = finder.find_runnable_tasks().await.unwrap();
    assert_eq!(ids(&runnable), vec!["test"]);

    // Once dispatched, a task leaves the undispatched listing.
    store.set_status("test", TaskStatus::Dispatched);
    assert!(store.find_undispatched_tasks().await.unwrap().is_empty());
    assert!(finder.find_runnable_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn result_is_independent_of_listing_order() {
    let mut tasks = vec![
        done("compile"),
        done("fetch"),
        pending("t1", &["compile", "fetch"]),
        pending("t2", &["t1"]),
        pending("t3", &["fetch"]),
        pending("t4", &[]),
    ];

    let forward = StoreTaskFinder::new(Arc::new(InMemoryTaskStore::new(tasks.clone())))
        .find_runnable_tasks()
        .await
        .unwrap();

    tasks.reverse();
    let backward = StoreTaskFinder::new(Arc::new(InMemoryTaskStore::new(tasks)))
        .find_runnable_tasks()
        .await
        .unwrap();

    let mut a = ids(&forward);
    let mut b = ids(&backward);
    a.sort();
    b.sort();
    assert_eq!(a, vec!["t1", "t3", "t4"]);
    assert_eq!(a, b);
}
