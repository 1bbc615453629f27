//! Channel-backed queue: a bounded MPMC channel used as a self-balancing counter.
//!
//! The channel is seeded with one item per worker and has exactly that much
//! capacity. Each worker takes an item, adds one, and puts it back. Which
//! items end up carrying the increments depends on scheduling; their sum
//! does not.

use crate::error::{Error, Result};
use crate::model::{ChannelReport, SEED_VALUE, Variant, WorkerCount, WorkerState};
use crate::telemetry::metrics;
use crate::telemetry::work::record_worker_state;
use async_channel::{Receiver, Sender};
use opentelemetry::KeyValue;
use opentelemetry::metrics::Counter;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{Span, debug};

use super::spawn_workers;

/// Runs N workers against a bounded channel of capacity N.
pub struct ChannelProcessor {
    workers: WorkerCount,
}

impl ChannelProcessor {
    pub fn new(workers: WorkerCount) -> Self {
        Self { workers }
    }

    pub async fn run(&self) -> Result<ChannelReport> {
        let capacity = self.workers.get();
        let (tx, rx) = async_channel::bounded::<u64>(capacity);
        for _ in 0..capacity {
            tx.try_send(SEED_VALUE)
                .map_err(|e| Error::Other(format!("seeding channel: {e}")))?;
        }

        let peak_len = Arc::new(AtomicUsize::new(tx.len()));
        let operations = metrics::queue_operations();

        spawn_workers(Variant::Channel, capacity, |_| {
            channel_turn(
                tx.clone(),
                rx.clone(),
                Arc::clone(&peak_len),
                operations.clone(),
            )
        })
        .await?;

        tx.close();

        let mut remaining_items = 0;
        let mut total_increments = 0;
        while let Ok(value) = rx.try_recv() {
            remaining_items += 1;
            total_increments += value - SEED_VALUE;
        }

        let report = ChannelReport {
            workers: capacity,
            capacity,
            remaining_items,
            total_increments,
            peak_len: peak_len.load(Ordering::Acquire),
        };
        debug!(
            remaining = report.remaining_items,
            increments = report.total_increments,
            peak_len = report.peak_len,
            "channel drained"
        );
        Ok(report)
    }
}

/// One worker's turn. A closed, empty channel means there is nothing to do.
async fn channel_turn(
    tx: Sender<u64>,
    rx: Receiver<u64>,
    peak_len: Arc<AtomicUsize>,
    operations: Counter<u64>,
) -> Result<()> {
    let span = Span::current();

    let item = match rx.recv().await {
        Ok(item) => item,
        Err(_) => {
            record_worker_state(&span, WorkerState::Spawned, WorkerState::Completed);
            return Ok(());
        }
    };
    record_worker_state(&span, WorkerState::Spawned, WorkerState::AcquiredAccess);
    operations.add(
        1,
        &[
            KeyValue::new("variant", "channel"),
            KeyValue::new("operation", "dequeue"),
        ],
    );

    let item = item + 1;
    record_worker_state(&span, WorkerState::AcquiredAccess, WorkerState::Mutated);

    if tx.send(item).await.is_ok() {
        peak_len.fetch_max(tx.len(), Ordering::AcqRel);
        operations.add(
            1,
            &[
                KeyValue::new("variant", "channel"),
                KeyValue::new("operation", "enqueue"),
            ],
        );
    }
    record_worker_state(&span, WorkerState::Mutated, WorkerState::ReleasedAccess);
    record_worker_state(&span, WorkerState::ReleasedAccess, WorkerState::Completed);
    Ok(())
}
