//! btleplug-backed transport.
//!
//! [`BleConnector`] finds a peripheral by address, connects and discovers its
//! services. btleplug only exposes characteristics by UUID, so
//! [`BleTransport`] resolves each [`CharacteristicBinding`] through its UUID
//! and keeps the binding's handle for reporting.
//!
//! All timeouts live here, in [`BleConfig`]. The session layer above never
//! times anything out itself.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, CharPropFlags, Characteristic, Manager as _, Peripheral as _,
    ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::StreamExt;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::TransportError;
use crate::profile::CharacteristicBinding;
use crate::transport::{CharProperties, Connector, GattCharacteristic, Transport};

/// Default time spent scanning for a peripheral that is not yet known.
const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for BLE connection operations.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for service discovery.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for BLE characteristic read operations.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for BLE characteristic write operations.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeouts for the btleplug transport.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use radiator_core::ble::BleConfig;
///
/// // Thick walls between the adapter and the radiator
/// let config = BleConfig::challenging_environment()
///     .scan_timeout(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct BleConfig {
    /// How long to scan for a peripheral the adapter has not seen yet.
    pub scan_timeout: Duration,
    /// Timeout for establishing a BLE connection.
    pub connection_timeout: Duration,
    /// Timeout for service discovery after connection.
    pub discovery_timeout: Duration,
    /// Timeout for BLE read operations.
    pub read_timeout: Duration,
    /// Timeout for BLE write operations.
    pub write_timeout: Duration,
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
            connection_timeout: DEFAULT_CONNECT_TIMEOUT,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl BleConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Longer timeouts for weak signals.
    pub fn challenging_environment() -> Self {
        Self {
            scan_timeout: Duration::from_secs(20),
            connection_timeout: Duration::from_secs(25),
            discovery_timeout: Duration::from_secs(15),
            read_timeout: Duration::from_secs(15),
            write_timeout: Duration::from_secs(15),
        }
    }

    /// Shorter timeouts for a device next to the adapter.
    pub fn fast() -> Self {
        Self {
            scan_timeout: Duration::from_secs(5),
            connection_timeout: Duration::from_secs(8),
            discovery_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
        }
    }

    /// Set the scan timeout.
    #[must_use]
    pub fn scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the service discovery timeout.
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    /// Set the read timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// Format a peripheral ID as a string.
///
/// On macOS, peripheral IDs are UUIDs. On other platforms they wrap the
/// Bluetooth address.
pub fn format_peripheral_id(id: &PeripheralId) -> String {
    format!("{:?}", id)
        .trim_start_matches("PeripheralId(")
        .trim_end_matches(')')
        .to_string()
}

/// Normalize an address for comparison: lowercase, no separators.
pub fn normalize_address(address: &str) -> String {
    address
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect::<String>()
        .to_lowercase()
}

/// Get the first available Bluetooth adapter.
pub async fn get_adapter() -> Result<Adapter, TransportError> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;

    adapters.into_iter().next().ok_or(TransportError::NoAdapter)
}

/// Check whether a peripheral answers to `wanted` (already normalized).
///
/// macOS hides MAC addresses and reports `00:00:00:00:00:00`, so the
/// peripheral ID is checked as well.
async fn peripheral_matches(peripheral: &Peripheral, wanted: &str) -> bool {
    if normalize_address(&format_peripheral_id(&peripheral.id())) == wanted {
        return true;
    }

    match peripheral.properties().await {
        Ok(Some(props)) => {
            let address = props.address.to_string();
            address != "00:00:00:00:00:00" && normalize_address(&address) == wanted
        }
        _ => false,
    }
}

/// Search the adapter's known peripherals.
async fn find_known_peripheral(
    adapter: &Adapter,
    wanted: &str,
) -> Result<Option<Peripheral>, TransportError> {
    for peripheral in adapter.peripherals().await? {
        if peripheral_matches(&peripheral, wanted).await {
            return Ok(Some(peripheral));
        }
    }
    Ok(None)
}

/// Scan until a matching peripheral shows up or the scan window closes.
async fn scan_for_peripheral(
    adapter: &Adapter,
    wanted: &str,
    scan_timeout: Duration,
) -> Result<Option<Peripheral>, TransportError> {
    let mut events = adapter.events().await?;
    adapter.start_scan(ScanFilter::default()).await?;
    info!("Scanning for up to {:?}...", scan_timeout);

    let found = timeout(scan_timeout, async {
        while let Some(event) = events.next().await {
            if let CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) = event
                && let Ok(peripheral) = adapter.peripheral(&id).await
                && peripheral_matches(&peripheral, wanted).await
            {
                return Some(peripheral);
            }
        }
        None
    })
    .await
    .ok()
    .flatten();

    if let Err(e) = adapter.stop_scan().await {
        warn!("Failed to stop scan: {}", e);
    }

    Ok(found)
}

fn properties_from_flags(flags: CharPropFlags) -> CharProperties {
    CharProperties {
        read: flags.contains(CharPropFlags::READ),
        write: flags.contains(CharPropFlags::WRITE),
        write_without_response: flags.contains(CharPropFlags::WRITE_WITHOUT_RESPONSE),
    }
}

fn lookup(
    discovered: &HashMap<Uuid, Characteristic>,
    binding: CharacteristicBinding,
) -> Option<GattCharacteristic> {
    discovered.get(&binding.uuid).map(|c| GattCharacteristic {
        handle: binding.handle,
        uuid: binding.uuid,
        properties: properties_from_flags(c.properties),
    })
}

/// Run one link setup step under `limit`.
///
/// On timeout or error `release` is awaited before the error is returned, so
/// a half-open link is never left behind.
async fn setup_step<T, S, R>(
    operation: &str,
    limit: Duration,
    step: S,
    release: R,
) -> Result<T, TransportError>
where
    S: Future<Output = Result<T, btleplug::Error>>,
    R: Future<Output = Result<(), btleplug::Error>>,
{
    let result = match timeout(limit, step).await {
        Ok(result) => result.map_err(TransportError::from),
        Err(_) => Err(TransportError::timeout(operation, limit)),
    };
    if result.is_err()
        && let Err(e) = release.await
    {
        debug!("Disconnect after failed {} also failed: {}", operation, e);
    }
    result
}

/// Opens [`BleTransport`] connections through the system Bluetooth adapter.
#[derive(Debug, Clone, Default)]
pub struct BleConnector {
    config: BleConfig,
}

impl BleConnector {
    /// Create a connector with the given timeouts.
    pub fn new(config: BleConfig) -> Self {
        Self { config }
    }

    /// The transport configuration.
    pub fn config(&self) -> &BleConfig {
        &self.config
    }
}

#[async_trait]
impl Connector for BleConnector {
    type Transport = BleTransport;

    #[tracing::instrument(level = "info", skip_all, fields(address = %address))]
    async fn connect(&self, address: &str) -> Result<BleTransport, TransportError> {
        let adapter = get_adapter().await?;
        let wanted = normalize_address(address);

        let peripheral = match find_known_peripheral(&adapter, &wanted).await? {
            Some(peripheral) => {
                debug!("Peripheral already known to adapter");
                peripheral
            }
            None => scan_for_peripheral(&adapter, &wanted, self.config.scan_timeout)
                .await?
                .ok_or_else(|| TransportError::DeviceNotFound(address.to_string()))?,
        };

        setup_step(
            "connect to device",
            self.config.connection_timeout,
            peripheral.connect(),
            peripheral.disconnect(),
        )
        .await?;
        setup_step(
            "discover services",
            self.config.discovery_timeout,
            peripheral.discover_services(),
            peripheral.disconnect(),
        )
        .await?;

        let mut characteristics = HashMap::new();
        for service in peripheral.services() {
            debug!("  Service: {}", service.uuid);
            for characteristic in service.characteristics {
                debug!("    Characteristic: {}", characteristic.uuid);
                characteristics.insert(characteristic.uuid, characteristic);
            }
        }

        Ok(BleTransport {
            adapter,
            peripheral,
            address: address.to_string(),
            characteristics,
            config: self.config.clone(),
        })
    }
}

/// A connected thermostat reached through btleplug.
pub struct BleTransport {
    /// Kept alive for as long as the peripheral connection.
    #[allow(dead_code)]
    adapter: Adapter,
    peripheral: Peripheral,
    address: String,
    characteristics: HashMap<Uuid, Characteristic>,
    config: BleConfig,
}

impl std::fmt::Debug for BleTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BleTransport")
            .field("address", &self.address)
            .field("characteristics", &self.characteristics.len())
            .finish_non_exhaustive()
    }
}

impl BleTransport {
    fn raw_characteristic(
        &self,
        characteristic: &GattCharacteristic,
    ) -> Result<&Characteristic, TransportError> {
        self.characteristics
            .get(&characteristic.uuid)
            .ok_or_else(|| {
                TransportError::other(format!(
                    "characteristic {} ({}) was not discovered on this connection",
                    characteristic.handle, characteristic.uuid
                ))
            })
    }
}

#[async_trait]
impl Transport for BleTransport {
    async fn characteristic(
        &self,
        binding: CharacteristicBinding,
    ) -> Result<Option<GattCharacteristic>, TransportError> {
        if !self.peripheral.is_connected().await? {
            return Err(TransportError::NotConnected);
        }

        Ok(lookup(&self.characteristics, binding))
    }

    async fn read(&self, characteristic: &GattCharacteristic) -> Result<Vec<u8>, TransportError> {
        let raw = self.raw_characteristic(characteristic)?;
        let data = timeout(self.config.read_timeout, self.peripheral.read(raw))
            .await
            .map_err(|_| {
                TransportError::timeout(
                    format!("read characteristic {}", characteristic.handle),
                    self.config.read_timeout,
                )
            })??;
        Ok(data)
    }

    async fn write(
        &self,
        characteristic: &GattCharacteristic,
        data: &[u8],
        with_response: bool,
    ) -> Result<(), TransportError> {
        let raw = self.raw_characteristic(characteristic)?;
        let write_type = if with_response {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        timeout(
            self.config.write_timeout,
            self.peripheral.write(raw, data, write_type),
        )
        .await
        .map_err(|_| {
            TransportError::timeout(
                format!("write characteristic {}", characteristic.handle),
                self.config.write_timeout,
            )
        })??;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.peripheral.disconnect().await?;
        Ok(())
    }

    fn address(&self) -> &str {
        &self.address
    }
}
