//! Example: Reading Thermostat State
//!
//! This example connects to a thermostat, logs in with its PIN and prints
//! the decoded control record.
//!
//! Run with: `cargo run --example read_state -- <DEVICE_ADDRESS> [PIN]`

use std::env;

use radiator_core::Pin;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let address = if args.len() > 1 {
        &args[1]
    } else {
        eprintln!("Usage: {} <DEVICE_ADDRESS> [PIN]", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  {} E0:E5:CF:00:11:22 123456", args[0]);
        std::process::exit(1);
    };
    let pin: Pin = match args.get(2) {
        Some(pin) => pin.parse()?,
        None => Pin::default(),
    };

    println!("Connecting to {}...", address);
    let session = radiator_core::prepare(address, pin).await?;
    println!("Connected and logged in!");
    println!();

    let state = session.get_state().await?;
    println!("Thermostat State:");
    println!("  Current:      {:.1} °C", state.current_temperature);
    println!("  Setpoint:     {:.1} °C", state.manual_setpoint);
    println!(
        "  Auto:         {:.1} - {:.1} °C",
        state.low_auto_setpoint, state.high_auto_setpoint
    );
    println!("  Offset:       {:+.1} °C", state.calibration_offset_signed());
    println!(
        "  Open window:  interval {} / duration {}",
        state.open_window_interval, state.open_window_duration
    );

    session.close().await?;
    println!();
    println!("Disconnected.");

    Ok(())
}
