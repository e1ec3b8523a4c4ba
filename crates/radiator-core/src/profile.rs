//! Firmware profiles.
//!
//! A profile pins down where the login and control characteristics live on
//! one firmware revision. Handles are never discovered at runtime; a device
//! running different firmware needs a different profile.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use radiator_types::CharacteristicHandle;
use radiator_types::gatt::{CONTROL_RECORD, CONTROL_RECORD_HANDLE, LOGIN, LOGIN_HANDLE};

/// A fixed handle together with the characteristic UUID behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicBinding {
    /// Characteristic declaration handle.
    pub handle: CharacteristicHandle,
    /// Characteristic UUID, for stacks that do not expose handles.
    pub uuid: Uuid,
}

impl CharacteristicBinding {
    /// Bind a handle to a UUID.
    pub const fn new(handle: CharacteristicHandle, uuid: Uuid) -> Self {
        Self { handle, uuid }
    }
}

/// Characteristic locations for one firmware revision.
///
/// # Example
///
/// ```
/// use radiator_core::FirmwareProfile;
///
/// let profile = FirmwareProfile::default();
/// assert_eq!(profile.login.handle.value(), 70);
/// assert_eq!(profile.control.handle.value(), 62);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareProfile {
    /// Login (PIN) characteristic.
    pub login: CharacteristicBinding,
    /// Control record characteristic.
    pub control: CharacteristicBinding,
}

impl Default for FirmwareProfile {
    fn default() -> Self {
        Self {
            login: CharacteristicBinding::new(LOGIN_HANDLE, LOGIN),
            control: CharacteristicBinding::new(CONTROL_RECORD_HANDLE, CONTROL_RECORD),
        }
    }
}

impl FirmwareProfile {
    /// Override the login handle.
    #[must_use]
    pub fn login_handle(mut self, handle: CharacteristicHandle) -> Self {
        self.login.handle = handle;
        self
    }

    /// Override the control record handle.
    #[must_use]
    pub fn control_handle(mut self, handle: CharacteristicHandle) -> Self {
        self.control.handle = handle;
        self
    }

    /// The bindings in this profile.
    pub fn bindings(&self) -> [CharacteristicBinding; 2] {
        [self.login, self.control]
    }

    /// Look up the UUID bound to a handle.
    pub fn uuid_for(&self, handle: CharacteristicHandle) -> Option<Uuid> {
        self.bindings()
            .into_iter()
            .find(|binding| binding.handle == handle)
            .map(|binding| binding.uuid)
    }
}
