//! Margmon CLI
//!
//! Serial telemetry monitor for 9-axis MARG sensor heads.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use margmon::{
    acquisition::{Acquisition, StopReason},
    config::Config,
    display::{ConsoleDisplay, NullSink, SnapshotSink},
    ledger::{default_ledger_path, Ledger, LedgerError},
    transport::{available_ports, SerialTransport},
    VERSION,
};

#[derive(Parser)]
#[command(name = "margmon")]
#[command(version = VERSION)]
#[command(about = "Serial telemetry monitor for 9-axis MARG sensor heads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring a serial telemetry source
    Run {
        /// Serial port to read from (e.g. /dev/ttyACM0 or COM3)
        #[arg(long)]
        port: Option<String>,

        /// Baud rate for the serial port
        #[arg(long)]
        baud: Option<u32>,

        /// Rolling window size in samples
        #[arg(long)]
        window_size: Option<usize>,

        /// Snapshot history size
        #[arg(long)]
        history_size: Option<usize>,

        /// Ledger file path (defaults to a timestamped file in the data directory)
        #[arg(long)]
        ledger: Option<PathBuf>,

        /// Append to an existing ledger instead of refusing to reuse it
        #[arg(long)]
        append: bool,

        /// Disable the raw-record ledger for this session
        #[arg(long)]
        no_ledger: bool,

        /// Treat commas between digits as decimal separators
        #[arg(long)]
        decimal_comma: bool,

        /// Poll interval of the read loop in milliseconds
        #[arg(long)]
        poll_interval_ms: Option<u64>,

        /// Suppress the per-cycle console line
        #[arg(long)]
        quiet: bool,
    },

    /// List serial ports detected on this machine
    Ports,

    /// Show configuration
    Config,
}

fn main() {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            port,
            baud,
            window_size,
            history_size,
            ledger,
            append,
            no_ledger,
            decimal_comma,
            poll_interval_ms,
            quiet,
        } => {
            cmd_run(
                port,
                baud,
                window_size,
                history_size,
                ledger,
                append,
                no_ledger,
                decimal_comma,
                poll_interval_ms,
                quiet,
            );
        }
        Commands::Ports => {
            cmd_ports();
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    port: Option<String>,
    baud: Option<u32>,
    window_size: Option<usize>,
    history_size: Option<usize>,
    ledger_path: Option<PathBuf>,
    append: bool,
    no_ledger: bool,
    decimal_comma: bool,
    poll_interval_ms: Option<u64>,
    quiet: bool,
) {
    println!("Margmon v{VERSION}");
    println!();

    // Load or create configuration, then fold in the CLI overrides
    let mut config = Config::load().unwrap_or_default();
    if let Some(baud) = baud {
        config.baud_rate = baud;
    }
    if let Some(size) = window_size {
        config.window_size = size;
    }
    if let Some(size) = history_size {
        config.history_size = size;
    }
    if decimal_comma {
        config.decimal_comma = true;
    }
    if let Some(ms) = poll_interval_ms {
        config.poll_interval = Duration::from_millis(ms);
    }

    let port = match port.or_else(|| config.port.clone()) {
        Some(port) => port,
        None => {
            eprintln!("Error: no serial port given.");
            eprintln!();
            eprintln!("Pass --port (e.g. --port /dev/ttyACM0) or set \"port\" in the config file.");
            eprintln!("Run `margmon ports` to list detected ports.");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: could not create directories: {e}");
    }

    // Resolve the ledger policy before touching the port
    let ledger = if no_ledger {
        None
    } else {
        let path = ledger_path.unwrap_or_else(|| default_ledger_path(&config.ledger_dir()));
        let opened = if append {
            Ledger::append_to(&path)
        } else {
            Ledger::create_new(&path)
        };
        match opened {
            Ok(ledger) => Some(ledger),
            Err(LedgerError::AlreadyExists(path)) => {
                eprintln!("Error: ledger {path:?} already exists.");
                eprintln!("Pass --append to continue it, or --ledger with a fresh path.");
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: could not open ledger: {e}");
                std::process::exit(1);
            }
        }
    };

    println!("Starting acquisition...");
    println!("  Port: {port}");
    println!("  Baud rate: {}", config.baud_rate);
    println!("  Window size: {} samples", config.window_size);
    println!("  History size: {} snapshots", config.history_size);
    match &ledger {
        Some(ledger) => println!("  Ledger: {:?}", ledger.path()),
        None => println!("  Ledger: disabled"),
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let transport = SerialTransport::new(&port, config.baud_rate);
    let mut session = Acquisition::new(transport, &config);
    if let Some(ledger) = ledger {
        session = session.with_ledger(ledger);
    }
    println!("Session ID: {}", session.session_id());
    println!();

    // Set up Ctrl+C handler
    let cancel = Arc::new(AtomicBool::new(false));
    ctrlc_handler(cancel.clone());

    let mut console = ConsoleDisplay::new(config.display_period);
    let mut muted = NullSink;
    let sink: &mut dyn SnapshotSink = if quiet { &mut muted } else { &mut console };

    let summary = match session.run(&cancel, sink) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error opening {port}: {e}");
            std::process::exit(1);
        }
    };

    println!();
    println!("Stopping acquisition...");
    println!();
    println!("{}", summary.render());

    if let Some(ledger) = session.ledger() {
        println!();
        println!(
            "Ledger: {} records at {:?}",
            ledger.records_written(),
            ledger.path()
        );
    }

    // Export session summary plus the statistics series
    if config.export_sessions {
        let export_path = config.export_dir().join(format!(
            "session_{}.json",
            summary.finished_at.format("%Y%m%d_%H%M%S")
        ));

        if let Some(parent) = export_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let doc = serde_json::json!({
            "summary": summary,
            "series": session.history().series(),
        });

        match serde_json::to_string_pretty(&doc) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&export_path, json) {
                    eprintln!("Error writing session export: {e}");
                } else {
                    println!("Exported session to {export_path:?}");
                }
            }
            Err(e) => {
                eprintln!("Error serializing session export: {e}");
            }
        }
    }

    if let StopReason::ConnectionLost(_) = summary.stop {
        std::process::exit(1);
    }
}

fn cmd_ports() {
    match available_ports() {
        Ok(ports) => {
            if ports.is_empty() {
                println!("No serial ports detected.");
            } else {
                println!("Available serial ports:");
                for port in ports {
                    println!("  {port}");
                }
            }
        }
        Err(e) => {
            eprintln!("Error listing serial ports: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Initialize logging from RUST_LOG, defaulting to info.
fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(cancel: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        cancel.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
