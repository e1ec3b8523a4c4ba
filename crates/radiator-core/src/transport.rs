//! Transport abstractions consumed by the session layer.
//!
//! The session never talks to a Bluetooth stack directly. It needs exactly
//! four capabilities: connect by address, resolve a characteristic from a
//! [`CharacteristicBinding`], read, and write with or without
//! acknowledgement. The
//! [`Connector`] and [`Transport`] traits describe those, so the protocol can
//! run against real hardware ([`crate::ble`]) or an in-memory device
//! ([`crate::mock`]).

use async_trait::async_trait;
use uuid::Uuid;

use radiator_types::CharacteristicHandle;

use crate::error::TransportError;
use crate::profile::CharacteristicBinding;

/// Operations a characteristic reports as supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharProperties {
    /// Readable.
    pub read: bool,
    /// Writable with acknowledgement.
    pub write: bool,
    /// Writable without acknowledgement.
    pub write_without_response: bool,
}

impl CharProperties {
    /// Read-only characteristic.
    pub const READ: Self = Self {
        read: true,
        write: false,
        write_without_response: false,
    };

    /// Write-only characteristic.
    pub const WRITE: Self = Self {
        read: false,
        write: true,
        write_without_response: false,
    };

    /// Readable and writable characteristic.
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
        write_without_response: false,
    };

    /// Whether any kind of write is supported.
    pub fn can_write(&self) -> bool {
        self.write || self.write_without_response
    }
}

/// A resolved characteristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattCharacteristic {
    /// The fixed handle the characteristic was resolved from.
    pub handle: CharacteristicHandle,
    /// The characteristic UUID.
    pub uuid: Uuid,
    /// Supported operations.
    pub properties: CharProperties,
}

/// A live connection to one peripheral.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Resolve the characteristic behind a binding.
    ///
    /// Stacks that expose ATT handles match on `binding.handle`; the rest
    /// match on `binding.uuid`. The session's profile is the only source of
    /// bindings. Returns `Ok(None)` when the device has no such
    /// characteristic and `Err` when the lookup itself failed.
    async fn characteristic(
        &self,
        binding: CharacteristicBinding,
    ) -> Result<Option<GattCharacteristic>, TransportError>;

    /// Read the raw value of a characteristic.
    async fn read(&self, characteristic: &GattCharacteristic) -> Result<Vec<u8>, TransportError>;

    /// Write a raw value, waiting for the device's acknowledgement when
    /// `with_response` is set.
    async fn write(
        &self,
        characteristic: &GattCharacteristic,
        data: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError>;

    /// Release the connection.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// The address this transport is connected to.
    fn address(&self) -> &str;
}

/// Opens [`Transport`] connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The transport produced by a successful connect.
    type Transport: Transport + 'static;

    /// Connect to the peripheral at `address`.
    async fn connect(&self, address: &str) -> Result<Self::Transport, TransportError>;
}
