//! Serial port transport.
//!
//! The port is opened with a short read timeout and handed to a reader
//! thread that assembles CR/LF-delimited lines from timed byte reads and
//! publishes them over a bounded channel. The consumer side drains that
//! channel with a bounded wait, so acquisition never blocks on the device
//! itself and cancellation stays responsive.

use crate::transport::{ConnectionError, Transport};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Read timeout on the port; also the reader's cancellation check period.
const PORT_TIMEOUT: Duration = Duration::from_millis(100);

/// Capacity of the line channel between the reader thread and the consumer.
const LINE_BUFFER: usize = 1024;

/// A serial connection delivering one telemetry record per line.
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    running: Arc<AtomicBool>,
    receiver: Option<Receiver<Result<String, ConnectionError>>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl SerialTransport {
    /// Create a transport for `port_name` at `baud_rate`; `open` connects.
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            running: Arc::new(AtomicBool::new(false)),
            receiver: None,
            thread_handle: None,
        }
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> Result<(), ConnectionError> {
        if self.running.load(Ordering::SeqCst) {
            return Ok(());
        }

        let port = serialport::new(&self.port_name, self.baud_rate)
            .timeout(PORT_TIMEOUT)
            .open()
            .map_err(|e| ConnectionError::OpenFailed {
                source: self.port_name.clone(),
                reason: e.to_string(),
            })?;

        self.running.store(true, Ordering::SeqCst);

        let (sender, receiver) = bounded(LINE_BUFFER);
        let running = self.running.clone();
        let port_name = self.port_name.clone();

        let handle = thread::spawn(move || {
            read_lines(port, sender, running.clone(), &port_name);
            running.store(false, Ordering::SeqCst);
        });

        self.receiver = Some(receiver);
        self.thread_handle = Some(handle);
        debug!("opened {} at {} baud", self.port_name, self.baud_rate);
        Ok(())
    }

    fn read_line(&mut self, wait: Duration) -> Result<Option<String>, ConnectionError> {
        let receiver = self
            .receiver
            .as_ref()
            .ok_or(ConnectionError::NotConnected)?;
        match receiver.recv_timeout(wait) {
            Ok(Ok(line)) => Ok(Some(line)),
            Ok(Err(e)) => Err(e),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(ConnectionError::Closed),
        }
    }

    fn close(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Dropping the receiver unblocks a sender stuck on a full channel
        self.receiver = None;
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.port_name, self.baud_rate)
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

/// Reader thread body: timed byte reads assembled into complete lines.
fn read_lines(
    mut port: Box<dyn serialport::SerialPort>,
    sender: Sender<Result<String, ConnectionError>>,
    running: Arc<AtomicBool>,
    port_name: &str,
) {
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 256];

    while running.load(Ordering::SeqCst) {
        match port.read(&mut chunk) {
            Ok(0) => {
                let _ = sender.send(Err(ConnectionError::Closed));
                return;
            }
            Ok(n) => {
                pending.extend_from_slice(&chunk[..n]);
                while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                    let mut line_bytes: Vec<u8> = pending.drain(..=pos).collect();
                    line_bytes.pop();
                    if line_bytes.last() == Some(&b'\r') {
                        line_bytes.pop();
                    }
                    // Lossy decoding: electrical noise must not kill the feed
                    let line = String::from_utf8_lossy(&line_bytes).into_owned();
                    if sender.send(Ok(line)).is_err() {
                        return;
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) => {
                warn!("serial read error on {port_name}: {e}");
                let _ = sender.send(Err(ConnectionError::ReadFailed {
                    reason: e.to_string(),
                }));
                return;
            }
        }
    }
    debug!("serial reader for {port_name} stopped");
}

/// Names of the serial ports currently present on the system.
pub fn available_ports() -> Result<Vec<String>, ConnectionError> {
    let ports = serialport::available_ports().map_err(|e| ConnectionError::OpenFailed {
        source: "port enumeration".to_string(),
        reason: e.to_string(),
    })?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
