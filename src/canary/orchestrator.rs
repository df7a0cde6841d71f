//! Sequences connect, probe and record for one canary run.

use chrono::Utc;
use tracing::{error, warn};

use crate::device::{DeviceConnector, DeviceSession, Target, report};
use crate::error::CanaryError;
use crate::mimir::MetricsExporter;
use crate::store::ResultStore;

use super::connection::{self, RetryPolicy};
use super::probe::{self, PinTarget};
use super::record::ResultRecord;
use super::recorder;

/// One configured canary: a target, the pin to exercise, and where results go.
pub struct Canary<C, S> {
    connector: C,
    store: S,
    target: Target,
    pin: PinTarget,
    policy: RetryPolicy,
    exporter: Option<MetricsExporter>,
}

impl<C, S> Canary<C, S>
where
    C: DeviceConnector,
    S: ResultStore,
{
    pub fn new(connector: C, store: S, target: Target, pin: PinTarget, policy: RetryPolicy) -> Self {
        Self {
            connector,
            store,
            target,
            pin,
            policy,
            exporter: None,
        }
    }

    pub fn with_exporter(mut self, exporter: MetricsExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Run the canary once.
    ///
    /// Exactly one record is persisted on every path. Connection and probe failures are
    /// returned after the record is stored, so the caller's exit status reflects them.
    pub async fn run(&self) -> Result<ResultRecord, CanaryError> {
        let mut record = ResultRecord::new(Utc::now());

        println!("connecting to robot at {} ...", self.target.address);

        let session =
            match connection::connect(&self.connector, &self.target, &self.policy, &mut record)
                .await
            {
                Ok(session) => session,
                Err(e) => return Err(self.record_failure(&record, e).await),
            };

        let outcome = match probe::run_probe(&session, &self.pin, &mut record).await {
            Ok(()) => self.record(&record).await,
            Err(e) => Err(self.record_failure(&record, e).await),
        };

        if let Err(e) = session.close().await {
            warn!(error = %report(&e), "failed to release device session");
        }

        outcome.map(|()| record)
    }

    async fn record(&self, record: &ResultRecord) -> Result<(), CanaryError> {
        recorder::persist(&self.store, record).await?;
        if let Some(exporter) = &self.exporter {
            exporter
                .export(record, &self.target.address, &self.pin.pin)
                .await;
        }
        Ok(())
    }

    /// Record a failed run and pick the error to surface. A lost record outranks the
    /// stage failure it was meant to describe.
    async fn record_failure(&self, record: &ResultRecord, stage: CanaryError) -> CanaryError {
        match self.record(record).await {
            Ok(()) => stage,
            Err(store_err) => {
                error!(error = %report(&stage), "canary failed and its result was not recorded");
                store_err
            }
        }
    }
}
