//! In-memory thermostat for testing.
//!
//! [`MockConnector`] hands out [`MockTransport`]s that all share one
//! simulated device. The device enforces the same rules as the real
//! firmware: the control record is only accessible after the correct PIN
//! has been written to the login characteristic with acknowledgement, and
//! bytes equal to [`NO_CHANGE`] in a write leave the stored value alone.
//!
//! Every transport call is logged as a [`MockCall`], so tests can assert on
//! exactly what went over the (pretend) air.
//!
//! # Example
//!
//! ```
//! use radiator_core::{MockConnector, Pin, Session};
//!
//! #[tokio::main]
//! async fn main() {
//!     let connector = MockConnector::builder()
//!         .pin(Pin::new(1234))
//!         .with_record(&[40, 42, 20, 28, 5, 10, 15])
//!         .build();
//!
//!     let session = Session::prepare(&connector, "AA:BB:CC:DD:EE:FF", Pin::new(1234))
//!         .await
//!         .unwrap();
//!     let record = session.get_state().await.unwrap();
//!     assert_eq!(record.manual_setpoint, 21.0);
//!     session.close().await.unwrap();
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use radiator_types::{CharacteristicHandle, NO_CHANGE, Pin, RECORD_LEN};

use crate::error::TransportError;
use crate::profile::{CharacteristicBinding, FirmwareProfile};
use crate::transport::{CharProperties, Connector, GattCharacteristic, Transport};

/// Record served when none is configured: 20 °C room, 21 °C setpoint.
const DEFAULT_RECORD: [u8; RECORD_LEN] = [40, 42, 34, 42, 0, 10, 15];

/// One call made against the mock device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `connect(address)`.
    Connect(String),
    /// Characteristic lookup.
    Characteristic(CharacteristicHandle),
    /// Read of a characteristic.
    Read(CharacteristicHandle),
    /// Write to a characteristic.
    Write {
        /// Target handle.
        handle: CharacteristicHandle,
        /// Raw payload.
        data: Vec<u8>,
        /// Whether acknowledgement was requested.
        with_response: bool,
    },
    /// `disconnect()`.
    Disconnect,
}

/// Failures the mock can be told to inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockFailure {
    /// Every connect attempt fails.
    Connect,
    /// Looking up this handle fails (as opposed to finding nothing).
    Lookup(CharacteristicHandle),
    /// Every read fails.
    Read,
    /// Every write to this handle fails.
    Write(CharacteristicHandle),
}

#[derive(Debug)]
struct MockState {
    pin: Pin,
    profile: FirmwareProfile,
    record: Vec<u8>,
    characteristics: HashMap<CharacteristicHandle, CharProperties>,
    failures: HashSet<MockFailure>,
    latency: Duration,
    connected: bool,
    logged_in: bool,
    calls: Vec<MockCall>,
}

impl MockState {
    fn ensure_connected(&self) -> Result<(), TransportError> {
        if self.connected {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }

    fn apply_write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if data.len() != RECORD_LEN || self.record.len() != RECORD_LEN {
            return Err(TransportError::other(format!(
                "invalid control write length: {} bytes",
                data.len()
            )));
        }
        for (stored, &byte) in self.record.iter_mut().zip(data) {
            if byte != NO_CHANGE {
                *stored = byte;
            }
        }
        Ok(())
    }
}

/// Builder for [`MockConnector`].
#[derive(Debug)]
pub struct MockConnectorBuilder {
    pin: Pin,
    profile: FirmwareProfile,
    record: Vec<u8>,
    missing: HashSet<CharacteristicHandle>,
    properties: HashMap<CharacteristicHandle, CharProperties>,
    failures: HashSet<MockFailure>,
    latency: Duration,
}

impl Default for MockConnectorBuilder {
    fn default() -> Self {
        Self {
            pin: Pin::new(0),
            profile: FirmwareProfile::default(),
            record: DEFAULT_RECORD.to_vec(),
            missing: HashSet::new(),
            properties: HashMap::new(),
            failures: HashSet::new(),
            latency: Duration::ZERO,
        }
    }
}

impl MockConnectorBuilder {
    /// Create a builder for a device with PIN 0 and the default profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// PIN the device accepts.
    #[must_use]
    pub fn pin(mut self, pin: Pin) -> Self {
        self.pin = pin;
        self
    }

    /// Firmware profile the device exposes.
    #[must_use]
    pub fn profile(mut self, profile: FirmwareProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Initial control record. Need not be 7 bytes.
    #[must_use]
    pub fn with_record(mut self, record: &[u8]) -> Self {
        self.record = record.to_vec();
        self
    }

    /// Remove a characteristic from the device.
    #[must_use]
    pub fn without_characteristic(mut self, handle: CharacteristicHandle) -> Self {
        self.missing.insert(handle);
        self
    }

    /// Override the properties a characteristic reports.
    #[must_use]
    pub fn characteristic_properties(
        mut self,
        handle: CharacteristicHandle,
        properties: CharProperties,
    ) -> Self {
        self.properties.insert(handle, properties);
        self
    }

    /// Inject a failure.
    #[must_use]
    pub fn fail(mut self, failure: MockFailure) -> Self {
        self.failures.insert(failure);
        self
    }

    /// Delay every transport call.
    #[must_use]
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Build the connector.
    pub fn build(self) -> MockConnector {
        let mut characteristics = HashMap::new();
        characteristics.insert(self.profile.login.handle, CharProperties::WRITE);
        characteristics.insert(self.profile.control.handle, CharProperties::READ_WRITE);
        characteristics.extend(self.properties);
        for handle in &self.missing {
            characteristics.remove(handle);
        }

        MockConnector {
            state: Arc::new(Mutex::new(MockState {
                pin: self.pin,
                profile: self.profile,
                record: self.record,
                characteristics,
                failures: self.failures,
                latency: self.latency,
                connected: false,
                logged_in: false,
                calls: Vec::new(),
            })),
        }
    }
}

/// Connector for the simulated thermostat.
#[derive(Debug, Clone)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockConnector {
    fn default() -> Self {
        MockConnectorBuilder::default().build()
    }
}

impl MockConnector {
    /// Start building a mock device.
    pub fn builder() -> MockConnectorBuilder {
        MockConnectorBuilder::new()
    }

    /// All calls made so far, in order.
    pub async fn calls(&self) -> Vec<MockCall> {
        self.state.lock().await.calls.clone()
    }

    /// Forget recorded calls.
    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Whether a transport is currently connected.
    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.connected
    }

    /// Whether the current connection has logged in.
    pub async fn is_logged_in(&self) -> bool {
        self.state.lock().await.logged_in
    }

    /// The stored control record.
    pub async fn current_record(&self) -> Vec<u8> {
        self.state.lock().await.record.clone()
    }

    /// Replace the stored control record.
    pub async fn set_record(&self, record: &[u8]) {
        self.state.lock().await.record = record.to_vec();
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self, address: &str) -> Result<MockTransport, TransportError> {
        let latency = {
            let mut state = self.state.lock().await;
            state.calls.push(MockCall::Connect(address.to_string()));
            if state.failures.contains(&MockFailure::Connect) {
                return Err(TransportError::DeviceNotFound(address.to_string()));
            }
            state.connected = true;
            state.logged_in = false;
            state.latency
        };
        simulate_latency(latency).await;

        Ok(MockTransport {
            address: address.to_string(),
            state: Arc::clone(&self.state),
        })
    }
}

/// Transport to the simulated thermostat.
#[derive(Debug)]
pub struct MockTransport {
    address: String,
    state: Arc<Mutex<MockState>>,
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn characteristic(
        &self,
        binding: CharacteristicBinding,
    ) -> Result<Option<GattCharacteristic>, TransportError> {
        let handle = binding.handle;
        let mut state = self.state.lock().await;
        state.calls.push(MockCall::Characteristic(handle));
        simulate_latency(state.latency).await;
        state.ensure_connected()?;
        if state.failures.contains(&MockFailure::Lookup(handle)) {
            return Err(TransportError::other("characteristic discovery failed"));
        }

        // A handle the device knows only matches under its own UUID
        if state
            .profile
            .uuid_for(handle)
            .is_some_and(|uuid| uuid != binding.uuid)
        {
            return Ok(None);
        }

        Ok(state
            .characteristics
            .get(&handle)
            .map(|&properties| GattCharacteristic {
                handle,
                uuid: binding.uuid,
                properties,
            }))
    }

    async fn read(&self, characteristic: &GattCharacteristic) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock().await;
        state.calls.push(MockCall::Read(characteristic.handle));
        simulate_latency(state.latency).await;
        state.ensure_connected()?;
        if state.failures.contains(&MockFailure::Read) {
            return Err(TransportError::other("mock read failure"));
        }

        if characteristic.handle == state.profile.control.handle {
            if !state.logged_in {
                return Err(TransportError::other("insufficient authentication"));
            }
            return Ok(state.record.clone());
        }
        Err(TransportError::other("read not permitted"))
    }

    async fn write(
        &self,
        characteristic: &GattCharacteristic,
        data: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError> {
        let handle = characteristic.handle;
        let mut state = self.state.lock().await;
        state.calls.push(MockCall::Write {
            handle,
            data: data.to_vec(),
            with_response,
        });
        simulate_latency(state.latency).await;
        state.ensure_connected()?;
        if state.failures.contains(&MockFailure::Write(handle)) {
            return Err(TransportError::other("mock write failure"));
        }

        if handle == state.profile.login.handle {
            // Firmware only acknowledges a correct PIN; anything else is an
            // error response to an acked write.
            if with_response && data == state.pin.to_le_bytes() {
                state.logged_in = true;
                return Ok(());
            }
            return Err(TransportError::other("login rejected"));
        }

        if handle == state.profile.control.handle {
            if !state.logged_in {
                return Err(TransportError::other("insufficient authentication"));
            }
            return state.apply_write(data);
        }
        Err(TransportError::other("write not permitted"))
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.calls.push(MockCall::Disconnect);
        state.connected = false;
        state.logged_in = false;
        Ok(())
    }

    fn address(&self) -> &str {
        &self.address
    }
}
