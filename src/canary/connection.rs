//! Bounded-retry connection to the target device.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use crate::device::{DeviceConnector, Target, TransportError, report};
use crate::error::CanaryError;

use super::record::ResultRecord;

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(500),
        }
    }
}

/// What a single attempt produced, and what the loop should do about it.
enum Attempt<S> {
    Connected(S),
    Retry(TransportError),
    GiveUp(TransportError),
}

async fn attempt<C: DeviceConnector>(
    connector: &C,
    target: &Target,
    number: u32,
    policy: &RetryPolicy,
) -> Attempt<C::Session> {
    match connector.connect(target).await {
        Ok(session) => Attempt::Connected(session),
        Err(e) if number >= policy.max_attempts => Attempt::GiveUp(e),
        Err(e) => Attempt::Retry(e),
    }
}

/// Connect to `target`, retrying per `policy`.
///
/// The latency clock starts before the first attempt and is never reset, so it covers
/// retry delays too. On success the record gets `connection_success` and the latency;
/// on exhaustion it gets the last transport error and the caller is told to abort.
pub async fn connect<C: DeviceConnector>(
    connector: &C,
    target: &Target,
    policy: &RetryPolicy,
    record: &mut ResultRecord,
) -> Result<C::Session, CanaryError> {
    let start = Instant::now();
    let mut number = 0;

    loop {
        number += 1;
        record.attempts = number;

        match attempt(connector, target, number, policy).await {
            Attempt::Connected(session) => {
                record.connection_latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                record.connection_success = true;
                info!(
                    address = %target.address,
                    attempts = number,
                    latency_ms = record.connection_latency_ms,
                    "connected to device"
                );
                return Ok(session);
            }
            Attempt::Retry(e) => {
                println!("{e}");
                warn!(attempt = number, error = %report(&e), "connection attempt failed");
            }
            Attempt::GiveUp(e) => {
                let err = CanaryError::ConnectionFailed {
                    address: target.address.clone(),
                    attempts: number,
                    source: e,
                };
                record.fail(&err);
                return Err(err);
            }
        }

        sleep(policy.delay).await;
    }
}
