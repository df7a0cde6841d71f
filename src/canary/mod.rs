//! The canary engine: connect with bounded retries, exercise a pin, record the outcome once.

pub mod connection;
pub mod orchestrator;
pub mod probe;
pub mod record;
pub mod recorder;

pub use connection::RetryPolicy;
pub use orchestrator::Canary;
pub use probe::PinTarget;
