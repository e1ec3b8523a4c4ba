//! Utility functions for CLI operations.

use anyhow::Result;

use radiator_core::{Error, Pin};

/// Process exit codes.
pub mod exit {
    pub const SUCCESS: u8 = 0;
    /// Connection failures and anything that is not a protocol error.
    pub const FAILURE: u8 = 1;
    pub const CHARACTERISTIC_LOOKUP: u8 = 2;
    pub const CHARACTERISTIC_NOT_FOUND: u8 = 3;
    pub const AUTH: u8 = 4;
    pub const READ: u8 = 5;
    pub const WRITE: u8 = 6;
    pub const INVALID_REQUEST: u8 = 7;
}

/// Get device address, with helpful error message.
pub fn require_device(device: Option<String>) -> Result<String> {
    device.ok_or_else(|| {
        anyhow::anyhow!(
            "No device specified. Use --device <ADDRESS>, set RADIATOR_DEVICE, \
             or add `device = \"...\"` to the config file."
        )
    })
}

/// Get the login PIN, with helpful error message.
pub fn require_pin(pin: Option<Pin>) -> Result<Pin> {
    pin.ok_or_else(|| {
        anyhow::anyhow!(
            "No PIN specified. Use --pin <PIN>, set RADIATOR_PIN, \
             or add `pin = ...` to the config file."
        )
    })
}

/// Map a protocol error to its exit code.
pub fn error_exit_code(err: &Error) -> u8 {
    match err {
        Error::Connection { .. } => exit::FAILURE,
        Error::CharacteristicLookup { .. } => exit::CHARACTERISTIC_LOOKUP,
        Error::CharacteristicNotFound { .. } => exit::CHARACTERISTIC_NOT_FOUND,
        Error::Auth { .. } | Error::NotAuthenticated => exit::AUTH,
        Error::Read { .. } => exit::READ,
        Error::Write { .. } => exit::WRITE,
        Error::InvalidRequest(_) => exit::INVALID_REQUEST,
        _ => exit::FAILURE,
    }
}

/// Exit code for any error the CLI can end with.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<Error>()
        .map_or(exit::FAILURE, error_exit_code)
}
