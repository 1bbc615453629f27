//! Worker count parsing from the single positional argument.

use crate::error::{Error, Result};
use crate::model::WorkerCount;

/// Parse the requested worker count.
///
/// Accepts any base-10 signed integer; values below
/// [`WorkerCount::MIN`] are raised to it without complaint.
pub fn parse_worker_count(arg: Option<&str>) -> Result<WorkerCount> {
    let raw = arg.ok_or(Error::MissingArgument)?;
    let requested: i64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidArgumentFormat(raw.to_string()))?;
    Ok(WorkerCount::clamped(requested))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_argument_is_rejected() {
        assert!(matches!(parse_worker_count(None), Err(Error::MissingArgument)));
    }

    #[test]
    fn non_numeric_argument_is_rejected() {
        match parse_worker_count(Some("abc")) {
            Err(Error::InvalidArgumentFormat(raw)) => assert_eq!(raw, "abc"),
            other => panic!("expected InvalidArgumentFormat, got {other:?}"),
        }
        assert!(parse_worker_count(Some("12.5")).is_err());
        assert!(parse_worker_count(Some("")).is_err());
    }

    #[test]
    fn small_and_negative_values_clamp() {
        assert_eq!(parse_worker_count(Some("50")).unwrap().get(), 100);
        assert_eq!(parse_worker_count(Some("-7")).unwrap().get(), 100);
        assert_eq!(parse_worker_count(Some("0")).unwrap().get(), 100);
    }

    #[test]
    fn large_values_pass_through() {
        assert_eq!(parse_worker_count(Some("500")).unwrap().get(), 500);
        assert_eq!(parse_worker_count(Some(" 100 ")).unwrap().get(), 100);
    }
}
