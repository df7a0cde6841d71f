//! Error types for the canary run.

use std::path::PathBuf;

use thiserror::Error;

use crate::canary::probe::ProbeStep;
use crate::device::TransportError;
use crate::store::StoreError;

/// Errors raised while assembling the process configuration.
///
/// These are fatal before any result record exists, so nothing is persisted for them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Terminal outcomes of a canary run.
#[derive(Debug, Error)]
pub enum CanaryError {
    #[error("failed to connect to {address} after {attempts} attempts")]
    ConnectionFailed {
        address: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("board probe failed during {step}")]
    ProbeFailed {
        step: ProbeStep,
        #[source]
        source: TransportError,
    },

    #[error("failed to persist canary result")]
    PersistenceFailed(#[source] StoreError),
}
