//! The board capability check: read, drive high, read again.

use std::fmt;

use tracing::debug;

use crate::device::DeviceSession;
use crate::error::CanaryError;

use super::record::ResultRecord;

/// Which pin the probe exercises.
#[derive(Debug, Clone, PartialEq)]
pub struct PinTarget {
    pub board: String,
    pub pin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStep {
    InitialRead,
    Write,
    FinalRead,
}

impl fmt::Display for ProbeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProbeStep::InitialRead => "initial pin read",
            ProbeStep::Write => "pin write",
            ProbeStep::FinalRead => "final pin read",
        })
    }
}

/// Run the pin get/set/get sequence. Read values are not checked: the probe verifies the
/// API is usable, not the electrical state. The first failing step aborts the rest.
pub async fn run_probe<S: DeviceSession>(
    session: &S,
    target: &PinTarget,
    record: &mut ResultRecord,
) -> Result<(), CanaryError> {
    match exercise_pin(session, target).await {
        Ok(()) => {
            record.probe_success = true;
            Ok(())
        }
        Err((step, source)) => {
            let err = CanaryError::ProbeFailed { step, source };
            record.fail(&err);
            Err(err)
        }
    }
}

async fn exercise_pin<S: DeviceSession>(
    session: &S,
    target: &PinTarget,
) -> Result<(), (ProbeStep, crate::device::TransportError)> {
    let before = session
        .get_gpio(&target.board, &target.pin)
        .await
        .map_err(|e| (ProbeStep::InitialRead, e))?;

    session
        .set_gpio(&target.board, &target.pin, true)
        .await
        .map_err(|e| (ProbeStep::Write, e))?;

    let after = session
        .get_gpio(&target.board, &target.pin)
        .await
        .map_err(|e| (ProbeStep::FinalRead, e))?;

    debug!(pin = %target.pin, before, after, "probe completed");
    Ok(())
}
