//! Transport layer: line-oriented byte streams feeding the acquisition loop.
//!
//! A transport frames a device's byte stream into text lines; nothing above
//! this layer depends on framing beyond "one record per line". The serial
//! implementation talks to real hardware; the mock replays a script for
//! tests and offline demos.

pub mod mock;
pub mod serial;

// Re-export commonly used types
pub use mock::{MockTransport, ScriptEvent};
pub use serial::{available_ports, SerialTransport};

use serde::Serialize;
use std::time::Duration;

/// Errors raised by a transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionError {
    /// Opening the source failed.
    OpenFailed { source: String, reason: String },
    /// The source reported a read failure.
    ReadFailed { reason: String },
    /// The stream ended or the device went away.
    Closed,
    /// A read was attempted before `open` or after `close`.
    NotConnected,
}

impl std::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionError::OpenFailed { source, reason } => {
                write!(f, "failed to open {source}: {reason}")
            }
            ConnectionError::ReadFailed { reason } => write!(f, "read failed: {reason}"),
            ConnectionError::Closed => write!(f, "connection closed"),
            ConnectionError::NotConnected => write!(f, "transport not open"),
        }
    }
}

impl std::error::Error for ConnectionError {}

/// A line-oriented connection to a telemetry source.
///
/// Address and rate are construction parameters of the implementation.
/// `read_line` waits at most `wait` for the next complete line and returns
/// `Ok(None)` when none arrived; that bounded wait is what paces an idle
/// acquisition cycle.
pub trait Transport {
    /// Open the connection. Failure leaves the transport unopened.
    fn open(&mut self) -> Result<(), ConnectionError>;

    /// Next complete line, `Ok(None)` if none arrived within `wait`.
    fn read_line(&mut self, wait: Duration) -> Result<Option<String>, ConnectionError>;

    /// Close the connection; further reads fail with `NotConnected`.
    fn close(&mut self);

    /// Human-readable source description for logs and summaries.
    fn describe(&self) -> String;
}
