//! Error types for radiator-core.
//!
//! Every protocol step has its own error variant so that callers can tell
//! "can't reach the device" from "wrong firmware" from "PIN rejected"
//! without parsing messages. [`Error::kind`] collapses the variants into
//! the six failure classes a caller usually branches on.
//!
//! | Kind | Raised by | Meaning |
//! |------|-----------|---------|
//! | [`ErrorKind::Connection`] | `Session::prepare` | Peripheral unreachable |
//! | [`ErrorKind::CharacteristicNotFound`] | `prepare`, operations | Handle lookup failed or handle absent |
//! | [`ErrorKind::Auth`] | `prepare`, operations | Login write failed, or session not authenticated |
//! | [`ErrorKind::Read`] | `get_state` | Control record read failed |
//! | [`ErrorKind::Write`] | `set_state` | Control record write failed |
//! | [`ErrorKind::InvalidRequest`] | `set_state` | Nothing (or nothing encodable) to write |
//!
//! None of these are retried inside the crate. Retrying authentication in
//! particular can trip the thermostat's lockout.

use std::time::Duration;

use thiserror::Error;

use radiator_types::{CharacteristicHandle, ParseError, RequestError};

/// Failures reported by a [`Transport`](crate::transport::Transport) or
/// [`Connector`](crate::transport::Connector).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// Bluetooth Low Energy error.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// No Bluetooth adapter available.
    #[error("no Bluetooth adapter available")]
    NoAdapter,

    /// No peripheral with the given address was seen.
    #[error("device '{0}' not found")]
    DeviceNotFound(String),

    /// Operation timed out.
    #[error("operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// The connection is no longer usable.
    #[error("not connected to device")]
    NotConnected,

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a free-form transport error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Why reading the control record failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadFailure {
    /// The transport call itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The characteristic does not report read support.
    #[error("reading is not supported")]
    NotReadable,

    /// The payload could not be decoded.
    #[error(transparent)]
    Malformed(#[from] ParseError),
}

/// Why writing the control record failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteFailure {
    /// The transport call itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The characteristic does not report write support.
    #[error("writing is not supported")]
    NotWritable,
}

/// Errors returned by sessions and control operations.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The peripheral could not be reached.
    #[error("could not connect to {address}: {source}")]
    Connection {
        /// Address that was dialed.
        address: String,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The transport failed while resolving a characteristic.
    #[error("could not get characteristic {handle}: {source}")]
    CharacteristicLookup {
        /// Handle being resolved.
        handle: CharacteristicHandle,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The characteristic handle does not exist on the device.
    #[error("could not find characteristic {handle}")]
    CharacteristicNotFound {
        /// Handle that did not resolve.
        handle: CharacteristicHandle,
    },

    /// The login write failed.
    ///
    /// The device rejects a wrong PIN exactly like a failed write, so this
    /// variant does not claim which of the two happened.
    #[error("login failed: {source}")]
    Auth {
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// A control operation was attempted on a session that never logged in.
    #[error("session is not authenticated")]
    NotAuthenticated,

    /// Reading the control record failed.
    #[error("read error on characteristic {handle}: {reason}")]
    Read {
        /// Control record handle.
        handle: CharacteristicHandle,
        /// What went wrong.
        #[source]
        reason: ReadFailure,
    },

    /// Writing the control record failed.
    #[error("write error on characteristic {handle}: {reason}")]
    Write {
        /// Control record handle.
        handle: CharacteristicHandle,
        /// What went wrong.
        #[source]
        reason: WriteFailure,
    },

    /// The write request was rejected before any I/O.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Peripheral unreachable.
    Connection,
    /// Login or control handle did not resolve.
    CharacteristicNotFound,
    /// Login failed or session unauthenticated.
    Auth,
    /// Control record read failed.
    Read,
    /// Control record write failed.
    Write,
    /// Request rejected locally.
    InvalidRequest,
}

impl Error {
    /// Create a connection error for an address.
    pub fn connection(address: impl Into<String>, source: TransportError) -> Self {
        Self::Connection {
            address: address.into(),
            source,
        }
    }

    /// Create a read error.
    pub fn read(handle: CharacteristicHandle, reason: impl Into<ReadFailure>) -> Self {
        Self::Read {
            handle,
            reason: reason.into(),
        }
    }

    /// Create a write error.
    pub fn write(handle: CharacteristicHandle, reason: impl Into<WriteFailure>) -> Self {
        Self::Write {
            handle,
            reason: reason.into(),
        }
    }

    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::CharacteristicLookup { .. } | Self::CharacteristicNotFound { .. } => {
                ErrorKind::CharacteristicNotFound
            }
            Self::Auth { .. } | Self::NotAuthenticated => ErrorKind::Auth,
            Self::Read { .. } => ErrorKind::Read,
            Self::Write { .. } => ErrorKind::Write,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// The underlying transport failure, if the error came from one.
    pub fn transport_cause(&self) -> Option<&TransportError> {
        match self {
            Self::Connection { source, .. }
            | Self::CharacteristicLookup { source, .. }
            | Self::Auth { source } => Some(source),
            Self::Read {
                reason: ReadFailure::Transport(source),
                ..
            }
            | Self::Write {
                reason: WriteFailure::Transport(source),
                ..
            } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias using radiator-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use radiator_types::gatt::{CONTROL_RECORD_HANDLE, LOGIN_HANDLE};

    #[test]
    fn test_error_display() {
        let err = Error::connection(
            "AA:BB:CC:DD:EE:FF",
            TransportError::DeviceNotFound("AA:BB:CC:DD:EE:FF".into()),
        );
        assert!(err.to_string().starts_with("could not connect to AA:BB:CC:DD:EE:FF"));

        let err = Error::CharacteristicNotFound {
            handle: LOGIN_HANDLE,
        };
        assert_eq!(err.to_string(), "could not find characteristic 0x0046");

        let err = Error::Auth {
            source: TransportError::other("ATT error 0x03"),
        };
        assert_eq!(err.to_string(), "login failed: ATT error 0x03");

        let err = Error::read(CONTROL_RECORD_HANDLE, ReadFailure::NotReadable);
        assert!(err.to_string().contains("reading is not supported"));

        let err = Error::from(RequestError::Empty);
        assert!(err.to_string().starts_with("invalid request"));
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let cases = [
            (
                Error::connection("x", TransportError::NoAdapter),
                ErrorKind::Connection,
            ),
            (
                Error::CharacteristicLookup {
                    handle: LOGIN_HANDLE,
                    source: TransportError::NotConnected,
                },
                ErrorKind::CharacteristicNotFound,
            ),
            (
                Error::CharacteristicNotFound {
                    handle: CONTROL_RECORD_HANDLE,
                },
                ErrorKind::CharacteristicNotFound,
            ),
            (
                Error::Auth {
                    source: TransportError::NotConnected,
                },
                ErrorKind::Auth,
            ),
            (Error::NotAuthenticated, ErrorKind::Auth),
            (
                Error::read(CONTROL_RECORD_HANDLE, TransportError::NotConnected),
                ErrorKind::Read,
            ),
            (
                Error::write(CONTROL_RECORD_HANDLE, WriteFailure::NotWritable),
                ErrorKind::Write,
            ),
            (
                Error::InvalidRequest(RequestError::Empty),
                ErrorKind::InvalidRequest,
            ),
        ];

        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn test_transport_cause() {
        let err = Error::Auth {
            source: TransportError::timeout("write login", Duration::from_secs(10)),
        };
        let cause = err.transport_cause().unwrap();
        assert!(cause.to_string().contains("10s"));

        let err = Error::read(
            CONTROL_RECORD_HANDLE,
            ParseError::InvalidLength {
                expected: 7,
                actual: 2,
            },
        );
        assert!(err.transport_cause().is_none());
        assert!(Error::NotAuthenticated.transport_cause().is_none());
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error as _;

        let err = Error::write(CONTROL_RECORD_HANDLE, TransportError::other("link lost"));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "link lost");
    }

    #[test]
    fn test_btleplug_error_conversion() {
        fn _assert_from_impl<T: From<btleplug::Error>>() {}
        _assert_from_impl::<TransportError>();
    }
}
