//! Authenticated thermostat sessions.
//!
//! A [`Session`] can only be obtained from [`Session::prepare`], which
//! connects and performs the PIN handshake before returning. There is no way
//! to build an unauthenticated session, so every control operation runs
//! after exactly one successful login.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use radiator_types::Pin;

use crate::error::{Error, Result, TransportError};
use crate::profile::{CharacteristicBinding, FirmwareProfile};
use crate::transport::{Connector, GattCharacteristic, Transport};

/// A live, authenticated connection to one thermostat.
///
/// # Cleanup
///
/// Call [`Session::close`] when done. A session dropped without `close`
/// logs a warning and spawns a best-effort disconnect on the current tokio
/// runtime, if there is one.
pub struct Session<T: Transport + 'static> {
    transport: Arc<T>,
    profile: FirmwareProfile,
    authenticated: bool,
    /// Set once the connection has been released (or handed to `close`).
    released: AtomicBool,
}

impl<T: Transport + 'static> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.transport.address())
            .field("authenticated", &self.authenticated)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl<T: Transport + 'static> Session<T> {
    /// Connect to `address` and log in with `pin`, using the default
    /// firmware profile.
    ///
    /// # Errors
    ///
    /// See [`Session::prepare_with_profile`].
    pub async fn prepare<C>(connector: &C, address: &str, pin: Pin) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        Self::prepare_with_profile(connector, address, pin, FirmwareProfile::default()).await
    }

    /// Connect to `address`, resolve the login characteristic and log in.
    ///
    /// Login is attempted exactly once. If any step after the connect
    /// fails, the connection is released before the error is returned.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the peripheral cannot be reached
    /// - [`Error::CharacteristicLookup`] if resolving the login handle fails
    /// - [`Error::CharacteristicNotFound`] if the login handle does not exist
    /// - [`Error::Auth`] if the PIN write fails or is rejected
    #[tracing::instrument(level = "info", skip_all, fields(address = %address))]
    pub async fn prepare_with_profile<C>(
        connector: &C,
        address: &str,
        pin: Pin,
        profile: FirmwareProfile,
    ) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        info!("connecting to: {}", address);
        let transport = connector
            .connect(address)
            .await
            .map_err(|source| Error::connection(address, source))?;
        info!("connection established");

        let mut session = Self {
            transport: Arc::new(transport),
            profile,
            authenticated: false,
            released: AtomicBool::new(false),
        };

        let login = match session.resolve(profile.login).await {
            Ok(login) => login,
            Err(e) => {
                session.release().await;
                return Err(e);
            }
        };

        if let Err(e) = session.authenticate(&login, pin).await {
            session.release().await;
            return Err(e);
        }

        Ok(session)
    }

    /// Write the PIN to the login characteristic.
    async fn authenticate(&mut self, login: &GattCharacteristic, pin: Pin) -> Result<()> {
        info!("sending pin");
        self.transport
            .write(login, &pin.to_le_bytes(), true)
            .await
            .map_err(|source| Error::Auth { source })?;
        self.authenticated = true;
        info!("pin accepted");
        Ok(())
    }

    /// Resolve a characteristic, classifying failures.
    pub(crate) async fn resolve(
        &self,
        binding: CharacteristicBinding,
    ) -> Result<GattCharacteristic> {
        let handle = binding.handle;
        match self.transport.characteristic(binding).await {
            Ok(Some(characteristic)) => Ok(characteristic),
            Ok(None) => Err(Error::CharacteristicNotFound { handle }),
            Err(source) => Err(Error::CharacteristicLookup { handle, source }),
        }
    }

    /// Fail unless the handshake has succeeded.
    pub(crate) fn ensure_authenticated(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(Error::NotAuthenticated)
        }
    }

    /// Whether the PIN handshake succeeded.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The peripheral address.
    pub fn address(&self) -> &str {
        self.transport.address()
    }

    /// The firmware profile in use.
    pub fn profile(&self) -> &FirmwareProfile {
        &self.profile
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Disconnect from the device.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the disconnect itself fails. The
    /// session is consumed either way.
    #[tracing::instrument(level = "info", skip(self), fields(address = %self.address()))]
    pub async fn close(self) -> std::result::Result<(), TransportError> {
        self.released.store(true, Ordering::SeqCst);
        info!("Disconnecting from device...");
        self.transport.disconnect().await
    }

    /// Disconnect on a failure path, logging instead of returning errors.
    async fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        if let Err(e) = self.transport.disconnect().await {
            debug!(address = %self.transport.address(), error = %e, "Disconnect after failed prepare failed");
        }
    }
}

impl<T: Transport + 'static> Drop for Session<T> {
    fn drop(&mut self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }

        warn!(
            address = %self.transport.address(),
            "Session dropped without calling close() - performing best-effort disconnect"
        );

        let transport = Arc::clone(&self.transport);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = transport.disconnect().await {
                    debug!(
                        address = %transport.address(),
                        error = %e,
                        "Best-effort disconnect failed (device may already be disconnected)"
                    );
                }
            });
        } else {
            warn!("No tokio runtime available for session disconnect on drop");
        }
    }
}
