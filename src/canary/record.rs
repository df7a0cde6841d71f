use std::error::Error;

use chrono::{DateTime, Utc};

use crate::error::CanaryError;

/// Outcome of one canary run. Built with failure defaults before any network activity
/// and flipped to success values only as each stage completes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Run start time; also the document's unique key.
    pub timestamp: DateTime<Utc>,
    pub connection_success: bool,
    pub probe_success: bool,
    /// Description of the first failure, empty when the run succeeded.
    pub error: String,
    /// Time from the first connection attempt to the successful one, retries included.
    pub connection_latency_ms: f64,
    /// Connection attempts made. Not persisted.
    pub attempts: u32,
}

impl ResultRecord {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            connection_success: false,
            probe_success: false,
            error: String::new(),
            connection_latency_ms: 0.0,
            attempts: 0,
        }
    }

    /// Keep the first failure description; later ones are ignored. The underlying cause's
    /// text is preferred, falling back to the stage error when the cause says nothing.
    pub fn fail(&mut self, error: &CanaryError) {
        if !self.error.is_empty() {
            return;
        }
        self.error = error
            .source()
            .map(|cause| cause.to_string())
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| error.to_string());
    }

    pub fn is_success(&self) -> bool {
        self.connection_success && self.probe_success && self.error.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canary::probe::ProbeStep;
    use crate::device::TransportError;

    fn probe_failure(message: &str) -> CanaryError {
        CanaryError::ProbeFailed {
            step: ProbeStep::Write,
            source: TransportError::Rpc {
                code: 7,
                message: message.to_string(),
            },
        }
    }

    #[test]
    fn new_record_has_failure_defaults() {
        let record = ResultRecord::new(Utc::now());
        assert!(!record.connection_success);
        assert!(!record.probe_success);
        assert!(record.error.is_empty());
        assert_eq!(record.connection_latency_ms, 0.0);
        assert!(!record.is_success());
    }

    #[test]
    fn first_failure_wins() {
        let mut record = ResultRecord::new(Utc::now());
        record.fail(&probe_failure("timeout"));
        record.fail(&probe_failure("connection reset"));
        assert_eq!(record.error, "timeout");
    }

    #[test]
    fn blank_cause_falls_back_to_stage_error() {
        let mut record = ResultRecord::new(Utc::now());
        record.fail(&probe_failure("  "));
        assert_eq!(record.error, "board probe failed during pin write");
    }
}
