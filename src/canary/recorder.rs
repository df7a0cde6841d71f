use tracing::info;

use crate::error::CanaryError;
use crate::store::ResultStore;

use super::record::ResultRecord;

/// Insert the record's current state. Called exactly once per run; a second call would
/// insert a duplicate key. Store failures propagate unchanged, with no retry.
pub async fn persist<S: ResultStore>(store: &S, record: &ResultRecord) -> Result<(), CanaryError> {
    store
        .insert(record)
        .await
        .map_err(CanaryError::PersistenceFailed)?;

    info!(
        timestamp = %record.timestamp,
        connection_success = record.connection_success,
        probe_success = record.probe_success,
        connection_latency_ms = record.connection_latency_ms,
        error = %record.error,
        "canary result recorded"
    );
    Ok(())
}
