//! Integration tests for the concurrent queue processor.
//!
//! Interleaving is up to the scheduler, so these only assert on aggregates:
//! cursor, length, increment sums and bounds.

use queuebench::engine::{self, ChannelProcessor, ListProcessor, WaitGroup};
use queuebench::error::Error;
use queuebench::model::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ---------------------------------------------------------------------------
// List-backed queue
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn list_clamped_count_yields_cursor_100_length_1100() {
    let workers = WorkerCount::clamped(50);
    let report = ListProcessor::new(workers).run().await.unwrap();

    assert_eq!(report.workers, 100);
    assert_eq!(report.cursor, 100);
    assert_eq!(report.length, 1100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn list_500_workers_yields_cursor_500_length_1500() {
    let report = ListProcessor::new(WorkerCount::clamped(500))
        .run()
        .await
        .unwrap();

    assert_eq!(report.seed_items, LIST_SEED_ITEMS);
    assert_eq!(report.cursor, 500);
    assert_eq!(report.length, 1500);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn list_more_workers_than_seed_items_grows_past_hint() {
    // Cursor overtakes the original seed, reading items appended by earlier workers.
    let report = ListProcessor::new(WorkerCount::clamped(2500))
        .run()
        .await
        .unwrap();

    assert_eq!(report.cursor, 2500);
    assert_eq!(report.length, LIST_SEED_ITEMS + 2500);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn list_tiny_seed_never_reads_out_of_bounds() {
    let report = ListProcessor::new(WorkerCount::clamped(300))
        .seed_items(1)
        .run()
        .await
        .unwrap();

    assert_eq!(report.cursor, 300);
    assert_eq!(report.length, 301);
    assert!(report.cursor <= report.length);
}

#[tokio::test]
async fn list_empty_seed_fails_every_worker() {
    let result = ListProcessor::new(WorkerCount::clamped(100))
        .seed_items(0)
        .run()
        .await;

    match result {
        Err(Error::Worker(msg)) => assert!(msg.starts_with("100 of 100"), "{msg}"),
        other => panic!("expected Worker error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Channel-backed queue
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn channel_increments_sum_to_worker_count() {
    let report = ChannelProcessor::new(WorkerCount::clamped(100))
        .run()
        .await
        .unwrap();

    assert_eq!(report.capacity, 100);
    assert_eq!(report.remaining_items, 100);
    assert_eq!(report.total_increments, 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn channel_never_exceeds_capacity() {
    let report = ChannelProcessor::new(WorkerCount::clamped(1000))
        .run()
        .await
        .unwrap();

    assert!(report.peak_len <= report.capacity);
    assert!(report.remaining_items <= report.capacity);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn channel_aggregate_is_stable_across_repeated_runs() {
    for _ in 0..5 {
        let report = ChannelProcessor::new(WorkerCount::clamped(400))
            .run()
            .await
            .unwrap();
        assert_eq!(report.total_increments, 400);
    }
}

// ---------------------------------------------------------------------------
// Run wrapper
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn run_wraps_list_outcome_in_report() {
    let report = engine::run(Variant::List, WorkerCount::clamped(250))
        .await
        .unwrap();

    assert_eq!(report.variant(), Variant::List);
    match report.outcome {
        Outcome::List(list) => {
            assert_eq!(list.cursor, 250);
            assert_eq!(list.length, 1250);
        }
        Outcome::Channel(_) => panic!("expected list outcome"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn run_wraps_channel_outcome_in_report() {
    let report = engine::run(Variant::Channel, WorkerCount::clamped(150))
        .await
        .unwrap();

    assert_eq!(report.variant(), Variant::Channel);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"]["variant"], "channel");
    assert_eq!(json["outcome"]["total_increments"], 150);
}

// ---------------------------------------------------------------------------
// Join-barrier
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn barrier_waits_for_every_worker() {
    let group = WaitGroup::new();
    let done = Arc::new(AtomicUsize::new(0));

    for i in 0..200u64 {
        let guard = group.add();
        let done = Arc::clone(&done);
        tokio::spawn(async move {
            let _guard = guard;
            tokio::time::sleep(std::time::Duration::from_micros(i % 7)).await;
            done.fetch_add(1, Ordering::AcqRel);
        });
    }

    group.wait().await;
    assert_eq!(done.load(Ordering::Acquire), 200);
    assert_eq!(group.pending(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn barrier_released_when_worker_panics() {
    let group = WaitGroup::new();

    for i in 0..10 {
        let guard = group.add();
        tokio::spawn(async move {
            let _guard = guard;
            if i == 3 {
                panic!("worker {i} blew up");
            }
        });
    }

    tokio::time::timeout(std::time::Duration::from_secs(5), group.wait())
        .await
        .expect("barrier should open even after a panic");
    assert_eq!(group.pending(), 0);
}
