pub mod client;
pub mod prompb;

use std::time::Duration;

use reqwest::Client;

use crate::canary::record::ResultRecord;
use crate::config::MimirConfig;

const JOB_LABEL: &str = "job";
const TARGET_LABEL: &str = "target";
const PIN_LABEL: &str = "pin";
const CONNECTION_SUCCESS_METRIC: &str = "canary_connection_success";
const PROBE_SUCCESS_METRIC: &str = "canary_probe_success";
const CONNECTION_LATENCY_METRIC: &str = "canary_connection_latency_ms";
const ATTEMPTS_METRIC: &str = "canary_attempts";

const CANARY_JOB: &str = "gpio-canary";

fn as_gauge(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

/// Creates the gauges describing one canary run:
///    - `canary_connection_success`: 1.0 when a session was established.
///    - `canary_probe_success`: 1.0 when the pin sequence completed.
///    - `canary_connection_latency_ms`: time to connect, retries included.
///    - `canary_attempts`: connection attempts made.
///
/// Samples carry the run's timestamp so they line up with the stored record.
pub fn create_canary_metrics(record: &ResultRecord, target: &str, pin: &str) -> Vec<prompb::TimeSeries> {
    let labels = [(JOB_LABEL, CANARY_JOB), (TARGET_LABEL, target), (PIN_LABEL, pin)];
    let timestamp = Some(record.timestamp.timestamp_millis());

    [
        (CONNECTION_SUCCESS_METRIC, as_gauge(record.connection_success)),
        (PROBE_SUCCESS_METRIC, as_gauge(record.probe_success)),
        (CONNECTION_LATENCY_METRIC, record.connection_latency_ms),
        (ATTEMPTS_METRIC, f64::from(record.attempts)),
    ]
    .into_iter()
    .map(|(name, value)| client::create_time_series(name, &labels, value, timestamp))
    .collect()
}

/// Pushes run metrics to Mimir. Failures are logged and otherwise ignored.
pub struct MetricsExporter {
    client: Client,
    config: MimirConfig,
}

impl MetricsExporter {
    pub fn new(config: MimirConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
        Ok(Self { client, config })
    }

    pub async fn export(&self, record: &ResultRecord, target: &str, pin: &str) {
        let metrics = create_canary_metrics(record, target, pin);
        match client::send_to_mimir(
            &self.client,
            &self.config.endpoint,
            self.config.tenant.as_deref(),
            metrics,
        )
        .await
        {
            Ok(()) => tracing::debug!(endpoint = %self.config.endpoint, "metrics exported"),
            Err(e) => tracing::warn!(
                endpoint = %self.config.endpoint,
                error = %e,
                "failed to export canary metrics"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::device::TransportError;
    use crate::error::CanaryError;

    fn value_of(series: &[prompb::TimeSeries], metric: &str) -> f64 {
        series
            .iter()
            .find(|s| s.labels[0].value == metric)
            .map(|s| s.samples[0].value)
            .unwrap_or_else(|| panic!("missing metric {metric}"))
    }

    #[test]
    fn failed_connection_exports_zero_gauges() {
        let mut record = ResultRecord::new(Utc::now());
        record.attempts = 5;
        record.fail(&CanaryError::ConnectionFailed {
            address: "https://robot".to_string(),
            attempts: 5,
            source: TransportError::Request("timeout".to_string()),
        });

        let series = create_canary_metrics(&record, "https://robot", "32");

        assert_eq!(series.len(), 4);
        assert_eq!(value_of(&series, CONNECTION_SUCCESS_METRIC), 0.0);
        assert_eq!(value_of(&series, PROBE_SUCCESS_METRIC), 0.0);
        assert_eq!(value_of(&series, ATTEMPTS_METRIC), 5.0);
    }

    #[test]
    fn labels_identify_target_and_pin() {
        let mut record = ResultRecord::new(Utc::now());
        record.connection_success = true;
        record.probe_success = true;
        record.connection_latency_ms = 48.0;

        let series = create_canary_metrics(&record, "https://robot", "32");

        assert_eq!(value_of(&series, CONNECTION_LATENCY_METRIC), 48.0);
        for s in &series {
            let names: Vec<_> = s.labels.iter().map(|l| (l.name.as_str(), l.value.as_str())).collect();
            assert!(names.contains(&("job", "gpio-canary")));
            assert!(names.contains(&("target", "https://robot")));
            assert!(names.contains(&("pin", "32")));
            assert_eq!(s.samples[0].timestamp, record.timestamp.timestamp_millis());
        }
    }
}
