//! Device-control collaborator: how the canary reaches the board.
//!
//! The engine only sees [`DeviceConnector`] and [`DeviceSession`]; [`grpc`] provides the
//! implementation used by the binary.

pub mod grpc;
pub mod proto;

use std::fmt::Write;

use thiserror::Error;

/// Opaque credential pair used to authenticate against the device endpoint.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub api_key_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_key_id", &self.api_key_id)
            .finish()
    }
}

/// The one device a canary run probes.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub address: String,
    pub credentials: Credentials,
}

/// Failures reported by the transport. `Display` is the bare underlying description.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Request(String),

    #[error("{message}")]
    Rpc { code: i32, message: String },

    #[error("{0}")]
    Decode(String),
}

/// Establishes authenticated sessions with a device.
#[allow(async_fn_in_trait)]
pub trait DeviceConnector {
    type Session: DeviceSession;

    async fn connect(&self, target: &Target) -> Result<Self::Session, TransportError>;
}

/// An established session with the device's control endpoint.
#[allow(async_fn_in_trait)]
pub trait DeviceSession {
    async fn get_gpio(&self, board: &str, pin: &str) -> Result<bool, TransportError>;

    async fn set_gpio(&self, board: &str, pin: &str, high: bool) -> Result<(), TransportError>;

    /// Release the session. Consumes it so it cannot be used afterwards.
    async fn close(self) -> Result<(), TransportError>;
}

/// Flatten an error and its sources into one line.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s
}

#[cfg(test)]
pub mod testing {
    //! Scripted in-memory device used by the engine tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    /// A GPIO call observed by a [`FakeSession`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum GpioCall {
        Get { board: String, pin: String },
        Set { board: String, pin: String, high: bool },
    }

    #[derive(Debug, Default)]
    pub struct DeviceLog {
        pub attempts: u32,
        pub calls: Vec<GpioCall>,
        pub closed: u32,
    }

    /// Plays back a script of connection outcomes, one per attempt. Once the script runs
    /// out every further attempt succeeds.
    pub struct ScriptedConnector {
        script: Mutex<VecDeque<Result<(), String>>>,
        connect_delay: Duration,
        fail_on_call: Option<(usize, String)>,
        pub log: Arc<Mutex<DeviceLog>>,
    }

    impl ScriptedConnector {
        pub fn new(script: Vec<Result<(), String>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                connect_delay: Duration::ZERO,
                fail_on_call: None,
                log: Arc::default(),
            }
        }

        pub fn reachable() -> Self {
            Self::new(Vec::new())
        }

        pub fn unreachable(error: &str) -> Self {
            Self::new((0..16).map(|_| Err(error.to_string())).collect())
        }

        /// Each attempt takes this long on the (tokio) clock.
        pub fn with_connect_delay(mut self, delay: Duration) -> Self {
            self.connect_delay = delay;
            self
        }

        /// Make the `index`-th GPIO call (zero based) fail with `message`.
        pub fn failing_call(mut self, index: usize, message: &str) -> Self {
            self.fail_on_call = Some((index, message.to_string()));
            self
        }

        pub fn attempts(&self) -> u32 {
            self.log.lock().unwrap().attempts
        }

        pub fn calls(&self) -> Vec<GpioCall> {
            self.log.lock().unwrap().calls.clone()
        }

        pub fn closed(&self) -> u32 {
            self.log.lock().unwrap().closed
        }
    }

    impl DeviceConnector for ScriptedConnector {
        type Session = FakeSession;

        async fn connect(&self, _target: &Target) -> Result<FakeSession, TransportError> {
            self.log.lock().unwrap().attempts += 1;
            if !self.connect_delay.is_zero() {
                tokio::time::sleep(self.connect_delay).await;
            }
            let next = self.script.lock().unwrap().pop_front().unwrap_or(Ok(()));
            next.map_err(TransportError::Request)?;
            Ok(FakeSession {
                log: Arc::clone(&self.log),
                fail_on_call: self.fail_on_call.clone(),
            })
        }
    }

    pub struct FakeSession {
        log: Arc<Mutex<DeviceLog>>,
        fail_on_call: Option<(usize, String)>,
    }

    impl FakeSession {
        fn record(&self, call: GpioCall) -> Result<(), TransportError> {
            let mut log = self.log.lock().unwrap();
            let index = log.calls.len();
            log.calls.push(call);
            match &self.fail_on_call {
                Some((failing, message)) if *failing == index => Err(TransportError::Rpc {
                    code: 7,
                    message: message.clone(),
                }),
                _ => Ok(()),
            }
        }
    }

    impl DeviceSession for FakeSession {
        async fn get_gpio(&self, board: &str, pin: &str) -> Result<bool, TransportError> {
            self.record(GpioCall::Get {
                board: board.to_string(),
                pin: pin.to_string(),
            })?;
            Ok(false)
        }

        async fn set_gpio(&self, board: &str, pin: &str, high: bool) -> Result<(), TransportError> {
            self.record(GpioCall::Set {
                board: board.to_string(),
                pin: pin.to_string(),
                high,
            })
        }

        async fn close(self) -> Result<(), TransportError> {
            self.log.lock().unwrap().closed += 1;
            Ok(())
        }
    }

    pub fn target() -> Target {
        Target {
            address: "https://canary-main.abc123.viam.cloud".to_string(),
            credentials: Credentials {
                api_key: "secret".to_string(),
                api_key_id: "key-id".to_string(),
            },
        }
    }
}
