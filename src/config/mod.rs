//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if a value is present but unusable.
//! The worker count itself comes from the command line, see [`workers`].

pub mod workers;

use crate::error::{Error, Result};

pub use workers::parse_worker_count;

#[derive(Debug, Clone)]
pub struct Config {
    pub otel_endpoint: Option<String>,
    pub log_level: String,
    pub service_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            otel_endpoint: std::env::var("OTEL_ENDPOINT")
                .ok()
                .filter(|s| !s.is_empty()),
            log_level: non_empty_var("LOG_LEVEL", "info")?,
            service_name: non_empty_var("QUEUEBENCH_SERVICE_NAME", "queuebench")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            otel_endpoint: None,
            log_level: "info".to_string(),
            service_name: "queuebench".to_string(),
        }
    }
}

fn non_empty_var(name: &str, default: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(Error::Config(format!(
            "environment variable {name} is set but empty"
        ))),
        Ok(value) => Ok(value),
        Err(_) => Ok(default.to_string()),
    }
}
