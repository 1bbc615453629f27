//! Concurrent queue processor: spawn workers, wait on the barrier, report.

pub mod barrier;
pub mod channel;
pub mod list;

pub use barrier::{CompletionGuard, WaitGroup};
pub use channel::ChannelProcessor;
pub use list::{ListProcessor, ListQueue};

use crate::error::{Error, Result};
use crate::model::{Outcome, RunId, RunReport, Variant, WorkerCount};
use crate::telemetry::metrics;
use crate::telemetry::work::{record_run_outcome, start_run_span, start_worker_span};
use chrono::Utc;
use opentelemetry::KeyValue;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{Instrument, debug, error};

/// Run one variant with the given worker count and report the result.
pub async fn run(variant: Variant, workers: WorkerCount) -> Result<RunReport> {
    let run_id = RunId::new();
    let span = start_run_span(variant, workers, run_id);
    let started_at = Utc::now();
    let start = Instant::now();

    let outcome = async {
        debug!("run started");
        let outcome = match variant {
            Variant::List => Outcome::List(ListProcessor::new(workers).run().await?),
            Variant::Channel => Outcome::Channel(ChannelProcessor::new(workers).run().await?),
        };
        Ok::<_, Error>(outcome)
    }
    .instrument(span.clone())
    .await?;

    let duration_ms = start.elapsed().as_millis() as u64;
    record_run_outcome(&span, duration_ms);
    metrics::run_duration_ms().record(
        duration_ms as f64,
        &[KeyValue::new("variant", variant.to_string())],
    );
    span.in_scope(|| debug!(duration_ms, "run finished"));

    Ok(RunReport {
        run_id,
        started_at,
        duration_ms,
        outcome,
    })
}

/// Spawn `workers` tasks built by `make` and block until all have finished.
///
/// Every task carries a completion guard, so a panicking worker still
/// releases the barrier. Workers that panic or return an error are counted
/// and reported as [`Error::Worker`] once the barrier opens.
pub(crate) async fn spawn_workers<F, Fut>(variant: Variant, workers: usize, make: F) -> Result<()>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let group = WaitGroup::new();
    let finished = Arc::new(AtomicUsize::new(0));
    let completed = metrics::workers_completed();
    let labels = [KeyValue::new("variant", variant.to_string())];

    for index in 0..workers {
        let guard = group.add();
        let finished = Arc::clone(&finished);
        let completed = completed.clone();
        let labels = labels.clone();
        let work = make(index);

        tokio::spawn(
            async move {
                let _guard = guard;
                match work.await {
                    Ok(()) => {
                        finished.fetch_add(1, Ordering::AcqRel);
                        completed.add(1, &labels);
                    }
                    Err(e) => error!(index, "worker failed: {e}"),
                }
            }
            .instrument(start_worker_span(index)),
        );
    }

    group.wait().await;

    let finished = finished.load(Ordering::Acquire);
    if finished != workers {
        return Err(Error::Worker(format!(
            "{} of {workers} workers did not complete",
            workers - finished
        )));
    }
    Ok(())
}
