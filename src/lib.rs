//! Margmon - serial telemetry monitor for 9-axis MARG sensor heads.
//!
//! This library reads whitespace- or delimiter-separated sensor records from
//! a serial line, parses them into accelerometer, gyroscope, and magnetometer
//! triples, and maintains rolling magnitude statistics over a bounded window.
//! Every raw record can be mirrored into a plain-text ledger for later
//! replay.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         margmon pipeline                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐    ┌──────────┐    ┌──────────┐    ┌───────────┐  │
//! │  │ Transport │───▶│  Parser  │───▶│  Window  │───▶│   Stats   │  │
//! │  │  (serial) │    │ (tokens) │    │  (FIFO)  │    │ (mean/std)│  │
//! │  └───────────┘    └──────────┘    └──────────┘    └───────────┘  │
//! │                        │                                │        │
//! │                        ▼                                ▼        │
//! │                   ┌──────────┐                    ┌───────────┐  │
//! │                   │  Ledger  │                    │  History  │  │
//! │                   │  (rows)  │                    │ (series)  │  │
//! │                   └──────────┘                    └───────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use margmon::acquisition::Acquisition;
//! use margmon::config::Config;
//! use margmon::display::ConsoleDisplay;
//! use margmon::transport::SerialTransport;
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//!
//! let config = Config::default();
//! let transport = SerialTransport::new("/dev/ttyACM0", config.baud_rate);
//! let mut session = Acquisition::new(transport, &config);
//!
//! let cancel = AtomicBool::new(false);
//! let mut display = ConsoleDisplay::new(Duration::from_secs(1));
//! let summary = session
//!     .run(&cancel, &mut display)
//!     .expect("failed to open serial port");
//! println!("{}", summary.render());
//! ```

pub mod acquisition;
pub mod config;
pub mod core;
pub mod display;
pub mod ledger;
pub mod transport;

// Re-export key types at crate root for convenience
pub use acquisition::{Acquisition, LinkState, SessionStats, SessionSummary, StopReason};
pub use config::Config;
pub use core::{
    compute, LineParser, ParseError, SampleVector, SampleWindow, StatsHistory, StatsSeries,
    StatsSnapshot,
};
pub use display::{ConsoleDisplay, NullSink, SnapshotSink};
pub use ledger::{default_ledger_path, Ledger, LedgerError};
pub use transport::{available_ports, ConnectionError, MockTransport, SerialTransport, Transport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
