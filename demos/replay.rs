//! Replay a canned burst of 9-axis records through the full pipeline.
//!
//! This example shows how to:
//! 1. Script a transport with recorded lines
//! 2. Run an acquisition session over it
//! 3. Print per-cycle statistics and the session summary
//!
//! Run with: cargo run --example replay
//!
//! No hardware is needed; the transport replays the script below.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use margmon::{
    acquisition::Acquisition,
    config::Config,
    display::ConsoleDisplay,
    transport::{MockTransport, ScriptEvent},
};

fn main() {
    println!("Margmon - Replay Demo");
    println!("=====================");
    println!();

    // A short capture from a desk-mounted sensor head: gravity on the
    // accelerometer, a slow turn on the gyro, Earth's field on the
    // magnetometer, plus one burst of line noise.
    let script = vec![
        ScriptEvent::Line("0.02 0.01 9.81 0.00 0.00 0.01 22.1 5.3 -41.2".to_string()),
        ScriptEvent::Line("0.03 -0.02 9.79 0.10 0.02 0.00 22.0 5.4 -41.0".to_string()),
        ScriptEvent::Line(
            "aX: 0.05, aY: 0.01, aZ: 9.80, gX: 0.52, gY: 0.04, gZ: 0.02, \
             mX: 21.9, mY: 5.6, mZ: -40.8"
                .to_string(),
        ),
        ScriptEvent::Idle,
        ScriptEvent::Line("0.04 0.00 9.82 1.10 0.05 0.03 21.8 5.7 -40.5".to_string()),
        ScriptEvent::Line("!! checksum error !!".to_string()),
        ScriptEvent::Line("0.01 0.02 9.80 0.70 0.03 0.02 21.9 5.5 -40.9".to_string()),
        ScriptEvent::Disconnect,
    ];

    let config = Config {
        window_size: 4,
        history_size: 32,
        poll_interval: Duration::from_millis(1),
        ..Config::default()
    };

    let transport = MockTransport::with_script(script);
    let mut session = Acquisition::new(transport, &config);

    println!("Session ID: {}", session.session_id());
    println!();

    // Zero period so every cycle prints a line
    let mut display = ConsoleDisplay::new(Duration::from_millis(0));
    let cancel = AtomicBool::new(false);

    let summary = match session.run(&cancel, &mut display) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error opening transport: {e}");
            return;
        }
    };

    println!();
    println!("{}", summary.render());
    println!();
    println!("Demo complete!");
}
