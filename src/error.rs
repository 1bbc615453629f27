//! Error types for queuebench.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Please provide a number of workers to run.")]
    MissingArgument,

    #[error("Failed to parse number of workers to run provided in argument: {0}")]
    InvalidArgumentFormat(String),

    #[error("queue exhausted: read cursor {head} reached length {len}")]
    QueueExhausted { head: usize, len: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("telemetry setup failed: {0}")]
    Telemetry(String),

    #[error("worker task failed: {0}")]
    Worker(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
