//! # queuebench
//!
//! Drives a fixed-size in-memory work queue with many concurrent workers.
//!
//! Two queue shapes are provided: a list guarded by a single lock, and a
//! bounded channel whose own atomicity keeps workers apart. Both wait on a
//! join-barrier and report only order-independent aggregates.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod telemetry;
