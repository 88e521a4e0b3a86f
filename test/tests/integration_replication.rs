//! Integration tests for replicated object synchronization
//! Key invariant: an update received from a worker reaches local observers
//! but is never pushed back to that same worker

use serde_json::json;

use interlink_shared::{Event, ObjectKey, ParagraphRef, ReplicaChange, ReplicatedObject};
use interlink_test::{assert_eventually, assert_never, RegistryCall, TestServer};

fn counter(value: i64) -> ReplicatedObject {
    ReplicatedObject::new("counter", json!(value), Some("n1"), None)
}

fn counter_key() -> ObjectKey {
    ObjectKey::new("counter", Some("n1"), None)
}

/// Pushes a run request after `events` and waits until the loop reaches it
fn push_and_settle(test: &TestServer, worker: &interlink_test::LocalWorker, events: Vec<Event>) {
    let marker = format!("marker-{}", test.process_listener.run_requests().len());
    for event in events {
        worker.push_event(event);
    }
    worker.push_event(Event::RunCommandRequest(ParagraphRef::new("n1", marker.as_str())));
    assert_eventually!(
        2_000,
        test.process_listener.run_requests().contains(&marker)
    );
}

#[test]
fn worker_update_reaches_observers_but_is_not_echoed() {
    let test = TestServer::new();
    let (group, _, worker) = test.add_worker("g1");

    push_and_settle(
        &test,
        &worker,
        vec![
            Event::ReplicatedObjectAdd(counter(1)),
            Event::ReplicatedObjectUpdate(counter(2)),
        ],
    );

    assert_eq!(group.registry().get(&counter_key()).unwrap().value, json!(2));
    assert!(group.registry().is_peer_backed(&counter_key()));
    assert_eq!(
        test.registry_listener.calls(),
        vec![
            RegistryCall::Add {
                group: group.id().clone(),
                name: "counter".to_string()
            },
            RegistryCall::Update {
                group: group.id().clone(),
                name: "counter".to_string(),
                value: json!(2)
            },
        ]
    );
    assert_never!(50, !worker.replica_changes().is_empty());
}

#[test]
fn local_write_is_pushed_to_the_worker() {
    let test = TestServer::new();
    let (group, _, worker) = test.add_worker("g1");
    push_and_settle(&test, &worker, vec![Event::ReplicatedObjectAdd(counter(1))]);

    group.registry().set(&counter_key(), json!(10)).unwrap();

    assert_eq!(
        worker.replica_changes(),
        vec![ReplicaChange::Updated(counter(10))]
    );
}

#[test]
fn controller_owned_object_is_not_echoed_either() {
    let test = TestServer::new();
    let (group, _, worker) = test.add_worker("g1");

    group.registry().add(counter(1)).unwrap();
    assert_eq!(worker.replica_changes(), vec![ReplicaChange::Added(counter(1))]);

    push_and_settle(&test, &worker, vec![Event::ReplicatedObjectUpdate(counter(5))]);

    assert_eq!(group.registry().get(&counter_key()).unwrap().value, json!(5));
    assert_eq!(worker.replica_changes().len(), 1);
}

#[test]
fn update_of_unknown_object_is_skipped() {
    let test = TestServer::new();
    let (group, _, worker) = test.add_worker("g1");

    push_and_settle(&test, &worker, vec![Event::ReplicatedObjectUpdate(counter(3))]);

    assert!(group.registry().is_empty());
    assert!(test.registry_listener.calls().is_empty());
}

#[test]
fn worker_remove_is_mirrored() {
    let test = TestServer::new();
    let (group, _, worker) = test.add_worker("g1");

    push_and_settle(
        &test,
        &worker,
        vec![
            Event::ReplicatedObjectAdd(counter(1)),
            Event::ReplicatedObjectRemove(counter_key()),
        ],
    );

    assert!(group.registry().get(&counter_key()).is_none());
    assert_eq!(
        test.registry_listener.calls().last(),
        Some(&RegistryCall::Remove {
            group: group.id().clone(),
            name: "counter".to_string()
        })
    );
    assert!(worker.replica_changes().is_empty());
}

#[test]
fn local_write_to_stopped_worker_is_not_pushed() {
    let test = TestServer::new();
    let (group, _, worker) = test.add_stopped_worker("g1");

    group.registry().add(counter(1)).unwrap();
    group.registry().set(&counter_key(), json!(2)).unwrap();

    assert!(worker.replica_changes().is_empty());
    assert_eq!(worker.connect_count(), 0);
    assert_eq!(test.registry_listener.calls().len(), 2);
}
