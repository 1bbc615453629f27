//! Run and worker span helpers.
//!
//! One span per run, one child span per worker. Worker state changes are
//! recorded as `trace` events so that a run with thousands of workers stays
//! quiet at the default filter.

use crate::model::{RunId, Variant, WorkerCount, WorkerState};
use tracing::Span;

/// Start a span covering a whole run.
///
/// `run.duration_ms` is declared empty and filled by [`record_run_outcome`].
pub fn start_run_span(variant: Variant, workers: WorkerCount, run_id: RunId) -> Span {
    tracing::info_span!(
        "queue.run",
        "run.id" = %run_id,
        "run.variant" = %variant,
        "run.workers" = workers.get(),
        "run.duration_ms" = tracing::field::Empty,
    )
}

/// Start a span for one worker's single turn.
pub fn start_worker_span(index: usize) -> Span {
    tracing::trace_span!("queue.worker", "worker.index" = index)
}

/// Record a worker state transition on the given span.
pub fn record_worker_state(span: &Span, from: WorkerState, to: WorkerState) {
    debug_assert!(from.can_transition_to(to), "{from} -> {to}");
    span.in_scope(|| {
        tracing::trace!(from = %from, to = %to, "worker_state");
    });
}

/// Record how long a run took.
pub fn record_run_outcome(span: &Span, duration_ms: u64) {
    span.record("run.duration_ms", duration_ms);
}
