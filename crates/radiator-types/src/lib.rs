//! Platform-agnostic types for BLE radiator thermostats.
//!
//! This crate holds the wire model of the thermostat protocol and can be
//! used without any Bluetooth stack.
//!
//! # Features
//!
//! - [`ControlRecord`]: decoded view of the 7-byte control characteristic
//! - [`ControlWrite`]: temperature/offset change, encoded as a write record
//! - [`Pin`]: login PIN with its little-endian wire form
//! - Fixed characteristic handles and UUIDs
//! - Error types for parsing and request validation
//!
//! # Wire layout
//!
//! | index | field | unit |
//! |-------|-------|------|
//! | 0 | current temperature | 0.5 °C |
//! | 1 | manual setpoint | 0.5 °C |
//! | 2 | low auto setpoint | 0.5 °C |
//! | 3 | high auto setpoint | 0.5 °C |
//! | 4 | calibration offset | 0.5 °C |
//! | 5 | open-window interval | raw |
//! | 6 | open-window duration | raw |
//!
//! # Example
//!
//! ```
//! use radiator_types::{ControlRecord, encode_write};
//!
//! let bytes = encode_write(Some(21.0), None).unwrap();
//! assert_eq!(bytes, [128, 42, 42, 42, 128, 128, 128]);
//!
//! let record = ControlRecord::decode(&[40, 42, 20, 28, 5, 10, 15]);
//! assert_eq!(record.high_auto_setpoint, 14.0);
//! ```

pub mod error;
pub mod types;
pub mod uuid;

pub use error::{ParseError, ParseResult, RequestError};
pub use types::{
    CharacteristicHandle, ControlRecord, ControlWrite, NO_CHANGE, Pin, RECORD_LEN,
    decode_half_degrees, encode_offset, encode_temperature, encode_write,
};
pub use self::uuid as gatt;


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every sendable half-degree step survives encode then decode.
        #[test]
        fn half_degree_temperature_is_lossless(step in 0u8..=255) {
            prop_assume!(step != NO_CHANGE);
            let celsius = f64::from(step) / 2.0;
            let byte = encode_temperature(celsius).unwrap();
            prop_assert_eq!(byte, step);
            prop_assert_eq!(f64::from(decode_half_degrees(byte)), celsius);
        }

        /// No accepted value is ever encoded as the no-change byte.
        #[test]
        fn accepted_values_never_encode_no_change(celsius in -200.0f64..200.0) {
            if let Ok(byte) = encode_temperature(celsius) {
                prop_assert_ne!(byte, NO_CHANGE);
            }
            if let Ok(byte) = encode_offset(celsius) {
                prop_assert_ne!(byte, NO_CHANGE);
            }
        }

        /// A temperature write always sets manual, low and high together.
        #[test]
        fn temperature_write_fills_setpoint_group(celsius in 0.0f64..=127.5) {
            prop_assume!(!(64.0..64.5).contains(&celsius));
            let bytes = encode_write(Some(celsius), None).unwrap();
            prop_assert_eq!(bytes[1], bytes[2]);
            prop_assert_eq!(bytes[2], bytes[3]);
            prop_assert_eq!(bytes[0], NO_CHANGE);
            prop_assert_eq!(bytes[4], NO_CHANGE);

            let setpoint = f64::from(ControlRecord::decode(&bytes).manual_setpoint);
            prop_assert!((setpoint - celsius).abs() < 0.5);
            prop_assert!(setpoint <= celsius);
        }

        /// Decoding never panics on any payload length.
        #[test]
        fn from_bytes_never_panics(data: Vec<u8>) {
            let _ = ControlRecord::from_bytes(&data);
        }

        /// Signed offsets survive encode then signed decode.
        #[test]
        fn signed_offset_round_trip(half in -127i8..=127) {
            let celsius = f64::from(half) / 2.0;
            let byte = encode_offset(celsius).unwrap();
            let record = ControlRecord::decode(&[0, 0, 0, 0, byte, 0, 0]);
            prop_assert_eq!(f64::from(record.calibration_offset_signed()), celsius);
        }
    }
}
