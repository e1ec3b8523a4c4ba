//! Control record operations.
//!
//! The two use cases of the protocol: read the current state, and apply a
//! temperature/offset change. Both run on an authenticated [`Session`].

use tracing::{debug, info};

use radiator_types::{ControlRecord, ControlWrite};

use crate::error::{Error, ReadFailure, Result, WriteFailure};
use crate::session::Session;
use crate::transport::Transport;

impl<T: Transport + 'static> Session<T> {
    /// Read and decode the control record.
    ///
    /// # Errors
    ///
    /// - [`Error::CharacteristicLookup`] / [`Error::CharacteristicNotFound`]
    ///   if the control handle does not resolve
    /// - [`Error::Read`] if the characteristic is not readable, the read
    ///   fails, or the payload is not 7 bytes
    #[tracing::instrument(level = "debug", skip(self), fields(address = %self.address()))]
    pub async fn get_state(&self) -> Result<ControlRecord> {
        self.ensure_authenticated()?;

        let binding = self.profile().control;
        let handle = binding.handle;
        let characteristic = self.resolve(binding).await?;
        if !characteristic.properties.read {
            return Err(Error::read(handle, ReadFailure::NotReadable));
        }

        let data = self
            .transport()
            .read(&characteristic)
            .await
            .map_err(|e| Error::read(handle, e))?;
        debug!("control record: {:02x?}", data);

        ControlRecord::from_bytes(&data).map_err(|e| Error::read(handle, e))
    }

    /// Change the manual temperature and/or the calibration offset.
    ///
    /// The request is encoded before any I/O, so an empty or out-of-range
    /// request never touches the device.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if neither value is given or one cannot
    ///   be encoded
    /// - [`Error::CharacteristicLookup`] / [`Error::CharacteristicNotFound`]
    ///   if the control handle does not resolve
    /// - [`Error::Write`] if the characteristic is not writable or the
    ///   acknowledged write fails
    pub async fn set_state(&self, temperature: Option<f64>, offset: Option<f64>) -> Result<()> {
        self.apply(ControlWrite {
            temperature,
            offset,
        })
        .await
    }

    /// Apply a [`ControlWrite`].
    ///
    /// See [`Session::set_state`].
    #[tracing::instrument(level = "debug", skip(self), fields(address = %self.address()))]
    pub async fn apply(&self, request: ControlWrite) -> Result<()> {
        self.ensure_authenticated()?;

        let payload = request.encode()?;
        if let Some(celsius) = request.temperature {
            info!("changing temperature to: {}", celsius);
        }
        if let Some(celsius) = request.offset {
            info!("changing offset to: {}", celsius);
        }
        debug!("write record: {:02x?}", payload);

        let binding = self.profile().control;
        let handle = binding.handle;
        let characteristic = self.resolve(binding).await?;
        if !characteristic.properties.can_write() {
            return Err(Error::write(handle, WriteFailure::NotWritable));
        }

        self.transport()
            .write(&characteristic, &payload, true)
            .await
            .map_err(|e| Error::write(handle, e))
    }
}

/// Read the current state of the thermostat behind `session`.
///
/// # Errors
///
/// See [`Session::get_state`].
pub async fn get_state<T: Transport + 'static>(session: &Session<T>) -> Result<ControlRecord> {
    session.get_state().await
}

/// Set a new temperature and/or offset on the thermostat behind `session`.
///
/// # Errors
///
/// See [`Session::set_state`].
pub async fn set_state<T: Transport + 'static>(
    session: &Session<T>,
    temperature: Option<f64>,
    offset: Option<f64>,
) -> Result<()> {
    session.set_state(temperature, offset).await
}
