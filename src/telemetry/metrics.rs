//! Metric instrument factories for queuebench.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without an OTLP endpoint the global provider is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("queuebench")
}

/// Counter: queue operations performed by workers.
/// Labels: `variant`, `operation` ("dequeue" | "enqueue").
pub fn queue_operations() -> Counter<u64> {
    meter()
        .u64_counter("queuebench.queue.operations")
        .with_description("Number of queue operations")
        .build()
}

/// Counter: workers that reached the completed state.
/// Labels: `variant`.
pub fn workers_completed() -> Counter<u64> {
    meter()
        .u64_counter("queuebench.workers.completed")
        .with_description("Number of completed workers")
        .build()
}

/// Histogram: run duration in milliseconds.
/// Labels: `variant`.
pub fn run_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("queuebench.run.duration_ms")
        .with_description("Run duration in milliseconds")
        .with_unit("ms")
        .build()
}
