//! Integration tests for the event dispatch loop
//! Each test drives a real loop thread against an in-memory worker

use std::time::{Duration, Instant};

use interlink_server::{ServerConfig, PollConfig};
use interlink_shared::{Event, GroupId, ParagraphRef, RawEvent, ResourceId};
use interlink_test::{assert_eventually, assert_never, fast_config, LocalWorker, TestServer};

fn run_request(paragraph_id: &str) -> Event {
    Event::RunCommandRequest(ParagraphRef::new("note", paragraph_id))
}

#[test]
fn events_are_handled_in_emission_order() {
    let test = TestServer::new();
    let (_, _, worker) = test.add_worker("g1");

    let expected: Vec<String> = (0..20).map(|i| format!("p{}", i)).collect();
    for paragraph_id in &expected {
        worker.push_event(run_request(paragraph_id));
    }

    assert_eventually!(2_000, test.process_listener.run_requests().len() == expected.len());
    assert_eq!(test.process_listener.run_requests(), expected);
}

#[test]
fn stopped_worker_is_never_contacted_until_it_runs() {
    let test = TestServer::new();
    let (_, process, worker) = test.add_stopped_worker("g1");
    worker.push_event(run_request("p1"));

    assert_never!(100, worker.connect_count() > 0);
    assert_eq!(worker.fetch_count(), 0);
    assert!(test.process_listener.run_requests().is_empty());

    process.set_running(true);
    assert_eventually!(2_000, test.process_listener.run_requests() == vec!["p1".to_string()]);
}

#[test]
fn failed_fetch_discards_the_connection_and_retries() {
    let test = TestServer::new();
    let (_, _, worker) = test.add_worker("g1");
    worker.fail_next_fetches(2);
    worker.push_event(run_request("p1"));

    assert_eventually!(2_000, test.process_listener.run_requests().len() == 1);
    // each failed fetch poisons its connection, so at least two more were opened
    assert!(worker.connect_count() >= 3, "connects: {}", worker.connect_count());
}

#[test]
fn refused_connections_back_off_and_retry() {
    let test = TestServer::new();
    let worker = LocalWorker::new("g1");
    worker.refuse_connections(true);
    worker.push_event(run_request("p1"));
    test.server
        .connect_remote_group("g1", worker.connector())
        .unwrap();

    assert_never!(100, !test.process_listener.run_requests().is_empty());

    worker.refuse_connections(false);
    assert_eventually!(2_000, test.process_listener.run_requests().len() == 1);
}

#[test]
fn malformed_and_unknown_events_are_skipped() {
    let test = TestServer::new();
    let (_, _, worker) = test.add_worker("g1");
    worker.push_raw(RawEvent::new("OUTPUT_APPEND", "{not json"));
    worker.push_raw(RawEvent::new("SOMETHING_NEWER", "{}"));
    worker.push_raw(RawEvent::new("RESOURCE_GET", ""));
    worker.push_event(run_request("after"));

    assert_eventually!(2_000, test.process_listener.run_requests() == vec!["after".to_string()]);
}

#[test]
fn panicking_listener_does_not_stop_the_loop() {
    let test = TestServer::new();
    test.process_listener.panic_on_paragraph("boom");
    let (_, _, worker) = test.add_worker("g1");
    worker.push_event(run_request("boom"));
    worker.push_event(run_request("fine"));

    assert_eventually!(2_000, test.process_listener.run_requests() == vec!["fine".to_string()]);
}

#[test]
fn removed_group_stops_polling() {
    let test = TestServer::new();
    let (_, _, worker) = test.add_worker("g1");
    assert_eventually!(2_000, worker.fetch_count() > 0);

    test.server.remove_group(&GroupId::from("g1")).unwrap();
    let fetches = worker.fetch_count();
    worker.push_event(run_request("late"));

    assert_never!(100, worker.fetch_count() > fetches);
    assert!(test.process_listener.run_requests().is_empty());
    assert!(test.group("g1").is_none());
    assert_eq!(test.server.resolve_one(&ResourceId::new("g1", "x")), None);
}

#[test]
fn duplicate_group_ids_are_refused() {
    let test = TestServer::new();
    test.add_local("g1");

    assert!(test.server.add_local_group("g1").is_err());
    assert!(test
        .server
        .connect_remote_group("g1", LocalWorker::new("g1").connector())
        .is_err());
    assert!(test.server.remove_group(&GroupId::from("nope")).is_err());
}

#[test]
fn shutdown_wakes_a_loop_in_back_off() {
    let test = TestServer::with_config(ServerConfig {
        poll: PollConfig {
            backoff: Duration::from_secs(30),
            backoff_jitter: Duration::ZERO,
            ..PollConfig::default()
        },
        ..fast_config()
    });
    let (_, _, worker) = test.add_worker("g1");
    worker.fail_next_fetches(usize::MAX);
    assert_eventually!(2_000, worker.fetch_count() > 0);

    let started = Instant::now();
    test.server.shutdown();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(test.server.add_local_group("g2").is_err());
}
