//! List-backed queue: a growable list plus a read cursor, one lock per turn.

use crate::error::{Error, Result};
use crate::model::{LIST_SEED_ITEMS, ListReport, SEED_VALUE, Variant, WorkerCount, WorkerState};
use crate::telemetry::metrics;
use crate::telemetry::work::record_worker_state;
use opentelemetry::KeyValue;
use opentelemetry::metrics::Counter;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Span;

use super::spawn_workers;

/// Items before `head` are consumed; they stay in place and are never read again.
#[derive(Debug, Clone)]
pub struct ListQueue {
    items: Vec<u64>,
    head: usize,
}

impl ListQueue {
    /// Seed `seed_items` items valued [`SEED_VALUE`].
    ///
    /// `capacity_hint` only sizes the initial allocation; the list grows
    /// past it when needed.
    pub fn seeded(seed_items: usize, capacity_hint: usize) -> Self {
        let mut items = Vec::with_capacity(capacity_hint.max(seed_items));
        items.resize(seed_items, SEED_VALUE);
        Self { items, head: 0 }
    }

    /// Take the item at the cursor, advance the cursor, append the item.
    pub fn rotate(&mut self) -> Result<u64> {
        let item = *self.items.get(self.head).ok_or(Error::QueueExhausted {
            head: self.head,
            len: self.items.len(),
        })?;
        self.head += 1;
        self.items.push(item);
        Ok(item)
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items not yet consumed.
    pub fn pending(&self) -> &[u64] {
        &self.items[self.head..]
    }
}

/// Runs N workers against one shared [`ListQueue`].
pub struct ListProcessor {
    workers: WorkerCount,
    seed_items: usize,
}

impl ListProcessor {
    pub fn new(workers: WorkerCount) -> Self {
        Self {
            workers,
            seed_items: LIST_SEED_ITEMS,
        }
    }

    /// Override the number of seed items.
    pub fn seed_items(mut self, seed_items: usize) -> Self {
        self.seed_items = seed_items;
        self
    }

    pub async fn run(&self) -> Result<ListReport> {
        let n = self.workers.get();
        let queue = Arc::new(Mutex::new(ListQueue::seeded(
            self.seed_items,
            self.seed_items + n,
        )));
        let operations = metrics::queue_operations();

        spawn_workers(Variant::List, n, |_| {
            list_turn(Arc::clone(&queue), operations.clone())
        })
        .await?;

        let queue = queue.lock().await;
        let report = ListReport {
            workers: n,
            seed_items: self.seed_items,
            cursor: queue.head(),
            length: queue.len(),
        };
        tracing::info!(cursor = report.cursor, "final read cursor");
        tracing::info!(length = report.length, "final queue length");
        Ok(report)
    }
}

/// One worker's turn. The lock is held across the whole read-advance-append.
async fn list_turn(queue: Arc<Mutex<ListQueue>>, operations: Counter<u64>) -> Result<()> {
    let span = Span::current();
    let mut guard = queue.lock().await;
    record_worker_state(&span, WorkerState::Spawned, WorkerState::AcquiredAccess);

    guard.rotate()?;
    record_worker_state(&span, WorkerState::AcquiredAccess, WorkerState::Mutated);

    drop(guard);
    record_worker_state(&span, WorkerState::Mutated, WorkerState::ReleasedAccess);

    operations.add(
        1,
        &[
            KeyValue::new("variant", "list"),
            KeyValue::new("operation", "dequeue"),
        ],
    );
    operations.add(
        1,
        &[
            KeyValue::new("variant", "list"),
            KeyValue::new("operation", "enqueue"),
        ],
    );
    record_worker_state(&span, WorkerState::ReleasedAccess, WorkerState::Completed);
    Ok(())
}
