//! GATT identifiers for the thermostat.
//!
//! The protocol addresses characteristics by fixed handle. The matching
//! UUIDs are listed as well because some BLE stacks (btleplug among them)
//! expose characteristics by UUID only.

use uuid::{Uuid, uuid};

use crate::types::CharacteristicHandle;

// --- Thermostat service ---

/// Vendor service carrying the thermostat characteristics.
pub const THERMOSTAT_SERVICE: Uuid = uuid!("47e9ee00-47e9-11e4-8939-164230d1df67");

/// Control record characteristic (7 bytes, read/write).
pub const CONTROL_RECORD: Uuid = uuid!("47e9ee2b-47e9-11e4-8939-164230d1df67");

/// Login characteristic (4-byte PIN, write-only).
pub const LOGIN: Uuid = uuid!("47e9ee30-47e9-11e4-8939-164230d1df67");

// --- Fixed handles ---

/// Declaration handle of the control record characteristic.
pub const CONTROL_RECORD_HANDLE: CharacteristicHandle = CharacteristicHandle::new(62);

/// Declaration handle of the login characteristic.
pub const LOGIN_HANDLE: CharacteristicHandle = CharacteristicHandle::new(70);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_distinct() {
        assert_ne!(CONTROL_RECORD_HANDLE, LOGIN_HANDLE);
        assert_eq!(CONTROL_RECORD_HANDLE.value(), 0x3E);
        assert_eq!(LOGIN_HANDLE.value(), 0x46);
    }

    #[test]
    fn test_characteristics_share_service_base() {
        let base = |u: Uuid| u.as_u128() & 0x0000_0000_ffff_ffff_ffff_ffff_ffff_ffff;
        assert_eq!(base(CONTROL_RECORD), base(THERMOSTAT_SERVICE));
        assert_eq!(base(LOGIN), base(THERMOSTAT_SERVICE));
    }
}
