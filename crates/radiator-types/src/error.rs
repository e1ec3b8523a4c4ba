//! Error types for radiator-types.

use thiserror::Error;

/// Errors that can occur when parsing a control record payload.
///
/// This error type is platform-agnostic and does not include
/// BLE-specific errors (those belong in radiator-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The payload did not have the fixed record length.
    #[error("Invalid record length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required number of bytes.
        expected: usize,
        /// Number of bytes received.
        actual: usize,
    },
}

/// Result type alias using radiator-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Reasons a write request is rejected before any I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[non_exhaustive]
pub enum RequestError {
    /// Neither a temperature nor an offset was supplied.
    #[error("nothing to write: no temperature and no offset given")]
    Empty,

    /// Temperature cannot be represented as an unsigned half-degree byte.
    #[error("temperature {0} °C is outside 0.0..=127.5")]
    TemperatureOutOfRange(f64),

    /// Temperature encodes to the "no change" byte and would be ignored.
    #[error("temperature {0} °C cannot be sent: 64.0 °C is reserved by the device")]
    TemperatureReserved(f64),

    /// Offset cannot be represented as a signed half-degree byte.
    #[error("offset {0} °C is outside -63.5..=63.5")]
    OffsetOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::InvalidLength {
            expected: 7,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Invalid record length: expected 7 bytes, got 3"
        );
    }

    #[test]
    fn test_request_error_display() {
        assert!(RequestError::Empty.to_string().contains("nothing to write"));
        assert!(
            RequestError::TemperatureOutOfRange(200.0)
                .to_string()
                .contains("200")
        );
        assert!(RequestError::OffsetOutOfRange(-70.0).to_string().contains("-70"));
        assert!(
            RequestError::TemperatureReserved(64.0)
                .to_string()
                .contains("reserved")
        );
    }
}
