//! Prometheus metrics for the conversion service.
//!
//! The recorder is installed by the binary; without one (tests) these
//! calls are no-ops.

use std::time::Duration;

use metrics::{counter, histogram};

/// Outcome label for `csv2bufr_transform_requests_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// At least one file written
    Success,
    /// Conversion ran but nothing was written, or an unexpected error
    Failed,
    /// Refused during validation (400/404)
    Rejected,
}

impl RequestOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestOutcome::Success => "success",
            RequestOutcome::Failed => "failed",
            RequestOutcome::Rejected => "rejected",
        }
    }
}

pub fn record_request(outcome: RequestOutcome, elapsed: Duration) {
    counter!("csv2bufr_transform_requests_total", "outcome" => outcome.as_str()).increment(1);
    histogram!("csv2bufr_transform_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_conversion_duration(elapsed: Duration) {
    histogram!("csv2bufr_engine_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_written_record(bytes: usize) {
    counter!("csv2bufr_records_total", "result" => "written").increment(1);
    counter!("csv2bufr_bytes_written_total").increment(bytes as u64);
}

pub fn record_empty_record() {
    counter!("csv2bufr_records_total", "result" => "empty").increment(1);
}

pub fn record_engine_error() {
    counter!("csv2bufr_engine_errors_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(RequestOutcome::Success.as_str(), "success");
        assert_eq!(RequestOutcome::Failed.as_str(), "failed");
        assert_eq!(RequestOutcome::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request(RequestOutcome::Success, Duration::from_millis(5));
        record_written_record(128);
        record_empty_record();
        record_engine_error();
    }
}
