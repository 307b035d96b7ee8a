//! Scripted transport for tests and offline replay.
//!
//! Replays a fixed sequence of events: complete lines, idle waits and a
//! disconnect. A finite script ends the way a device unplug does, so
//! end-to-end paths can be exercised without hardware.

use crate::transport::{ConnectionError, Transport};
use std::collections::VecDeque;
use std::time::Duration;

/// One scripted transport event.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptEvent {
    /// A complete line arrives.
    Line(String),
    /// Nothing arrives within the bounded wait.
    Idle,
    /// The connection breaks.
    Disconnect,
}

/// A transport that replays a fixed script.
#[derive(Debug, Clone)]
pub struct MockTransport {
    script: VecDeque<ScriptEvent>,
    open_error: Option<String>,
    open: bool,
}

impl MockTransport {
    /// Transport that delivers `lines` in order, then disconnects.
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_script(
            lines
                .into_iter()
                .map(|line| ScriptEvent::Line(line.into()))
                .collect(),
        )
    }

    /// Transport that replays `script` in order, then disconnects.
    pub fn with_script(script: Vec<ScriptEvent>) -> Self {
        Self {
            script: script.into(),
            open_error: None,
            open: false,
        }
    }

    /// Transport whose `open` fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            script: VecDeque::new(),
            open_error: Some(reason.into()),
            open: false,
        }
    }

    /// Number of script events not yet replayed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Transport for MockTransport {
    fn open(&mut self) -> Result<(), ConnectionError> {
        if let Some(reason) = &self.open_error {
            return Err(ConnectionError::OpenFailed {
                source: self.describe(),
                reason: reason.clone(),
            });
        }
        self.open = true;
        Ok(())
    }

    fn read_line(&mut self, _wait: Duration) -> Result<Option<String>, ConnectionError> {
        if !self.open {
            return Err(ConnectionError::NotConnected);
        }
        match self.script.pop_front() {
            Some(ScriptEvent::Line(line)) => Ok(Some(line)),
            Some(ScriptEvent::Idle) => Ok(None),
            Some(ScriptEvent::Disconnect) | None => Err(ConnectionError::Closed),
        }
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn describe(&self) -> String {
        "scripted feed".to_string()
    }
}
