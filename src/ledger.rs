//! Append-only plain-text ledger of accepted records.
//!
//! One header line is written when a destination is brand new, then one
//! `"; "`-joined 9-field line per accepted sample, with decimal points on
//! disk. Opening an existing path requires explicit append intent, so a
//! session can never silently clobber an earlier recording.

use crate::core::parse::SampleVector;
use chrono::Local;
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

/// Header naming the nine fields, written once per destination.
pub const LEDGER_HEADER: &str = "A_X; A_Y; A_Z; G_X; G_Y; G_Z; B_X; B_Y; B_Z";

/// Errors raised by the ledger.
#[derive(Debug)]
pub enum LedgerError {
    /// Destination already exists and appending was not requested.
    AlreadyExists(PathBuf),
    /// Underlying file operation failed.
    Io(std::io::Error),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::AlreadyExists(path) => {
                write!(
                    f,
                    "ledger {} already exists (append not requested)",
                    path.display()
                )
            }
            LedgerError::Io(e) => write!(f, "ledger I/O error: {e}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(e: std::io::Error) -> Self {
        LedgerError::Io(e)
    }
}

/// Append-only record writer with a header-once discipline.
///
/// Line-buffered, so every record reaches the file as soon as its newline
/// is written.
pub struct Ledger {
    writer: LineWriter<File>,
    path: PathBuf,
    records_written: u64,
}

impl Ledger {
    /// Create a brand-new ledger; refuses to touch an existing path.
    pub fn create_new(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => LedgerError::AlreadyExists(path.clone()),
                _ => LedgerError::Io(e),
            })?;
        let mut writer = LineWriter::new(file);
        writeln!(writer, "{LEDGER_HEADER}")?;
        debug!("ledger created at {}", path.display());
        Ok(Self {
            writer,
            path,
            records_written: 0,
        })
    }

    /// Open a destination for appending.
    ///
    /// The header is written only when the file is brand new or empty;
    /// an existing recording keeps its single header.
    pub fn append_to(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = LineWriter::new(file);
        if needs_header {
            writeln!(writer, "{LEDGER_HEADER}")?;
        }
        debug!("ledger appending at {}", path.display());
        Ok(Self {
            writer,
            path,
            records_written: 0,
        })
    }

    /// Append one record as a `"; "`-joined 9-field line.
    pub fn append(&mut self, sample: &SampleVector) -> Result<(), LedgerError> {
        writeln!(self.writer, "{}", format_record(sample))?;
        self.records_written += 1;
        Ok(())
    }

    /// Destination path of this ledger.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended through this handle (pre-existing lines excluded).
    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

/// One record as on-disk text: nine fields joined with `"; "`.
pub fn format_record(sample: &SampleVector) -> String {
    sample
        .components()
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Timestamped default destination under `dir`.
pub fn default_ledger_path(dir: &Path) -> PathBuf {
    dir.join(format!("imu_{}.txt", Local::now().format("%Y%m%d_%H%M%S")))
}
