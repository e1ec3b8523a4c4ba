//! Core BLE library for electronic radiator thermostats.
//!
//! This crate talks to Comet Blue style thermostats over Bluetooth Low
//! Energy: it connects, logs in with the device PIN, and reads or rewrites
//! the 7-byte control record.
//!
//! # Features
//!
//! - **Authenticated sessions**: [`Session::prepare`] connects and logs in
//!   exactly once; there is no way to hold an unauthenticated session
//! - **State read**: [`Session::get_state`] decodes the control record
//! - **State write**: [`Session::set_state`] changes the setpoint and/or
//!   calibration offset, leaving every other field untouched
//! - **Firmware profiles**: fixed characteristic handles live in a
//!   [`FirmwareProfile`] rather than in the protocol code
//! - **Pluggable transport**: [`BleConnector`] for real hardware,
//!   [`MockConnector`] for tests
//!
//! # Platform Differences
//!
//! On Linux and Windows a thermostat is addressed by its MAC address
//! (`AA:BB:CC:DD:EE:FF`). On macOS CoreBluetooth assigns a per-host UUID
//! instead, which is what must be passed as the address there.
//!
//! # Quick Start
//!
//! ```no_run
//! use radiator_core::Pin;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = radiator_core::prepare("AA:BB:CC:DD:EE:FF", Pin::new(0)).await?;
//!
//!     let state = session.get_state().await?;
//!     println!("current: {} °C", state.current_temperature);
//!
//!     session.set_state(Some(21.0), None).await?;
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

pub mod ble;
pub mod error;
pub mod mock;
pub mod operations;
pub mod profile;
pub mod session;
pub mod transport;

// Re-export types
pub use radiator_types::types;

pub use ble::{BleConfig, BleConnector, BleTransport};
pub use error::{Error, ErrorKind, ReadFailure, Result, TransportError, WriteFailure};
pub use mock::{MockCall, MockConnector, MockConnectorBuilder, MockFailure, MockTransport};
pub use operations::{get_state, set_state};
pub use profile::{CharacteristicBinding, FirmwareProfile};
pub use session::Session;
pub use transport::{CharProperties, Connector, GattCharacteristic, Transport};

// Re-export commonly used types
pub use radiator_types::gatt;
pub use radiator_types::{
    CharacteristicHandle, ControlRecord, ControlWrite, ParseError, Pin, RequestError,
};

/// Connect to the thermostat at `address` over BLE and log in.
///
/// Uses [`BleConnector::default`] and the default [`FirmwareProfile`]. Build
/// a [`BleConnector`] and call [`Session::prepare_with_profile`] to change
/// either.
///
/// # Errors
///
/// See [`Session::prepare_with_profile`].
pub async fn prepare(address: &str, pin: Pin) -> Result<Session<BleTransport>> {
    Session::prepare(&BleConnector::default(), address, pin).await
}
