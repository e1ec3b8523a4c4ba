//! Core types for the thermostat control protocol.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult, RequestError};

/// Length of the control record characteristic payload in bytes.
pub const RECORD_LEN: usize = 7;

/// Wire value meaning "leave this field unchanged" in a write record.
pub const NO_CHANGE: u8 = 0x80;

/// Wire index of the measured temperature.
pub const CURRENT_TEMPERATURE_INDEX: usize = 0;
/// Wire index of the manual setpoint.
pub const MANUAL_SETPOINT_INDEX: usize = 1;
/// Wire index of the scheduled low setpoint.
pub const LOW_AUTO_SETPOINT_INDEX: usize = 2;
/// Wire index of the scheduled high setpoint.
pub const HIGH_AUTO_SETPOINT_INDEX: usize = 3;
/// Wire index of the sensor calibration offset.
pub const CALIBRATION_OFFSET_INDEX: usize = 4;
/// Wire index of the open-window detection interval.
pub const OPEN_WINDOW_INTERVAL_INDEX: usize = 5;
/// Wire index of the open-window detection duration.
pub const OPEN_WINDOW_DURATION_INDEX: usize = 6;

/// A fixed GATT characteristic handle.
///
/// Handles are firmware-specific constants and are never discovered at
/// runtime. They identify the characteristic declaration, so a lookup by
/// handle matches exactly one characteristic on a known firmware revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct CharacteristicHandle(pub u16);

impl CharacteristicHandle {
    /// Create a handle from its numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// The numeric handle value.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl From<u16> for CharacteristicHandle {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for CharacteristicHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Device PIN used for the login handshake.
///
/// The PIN goes over the air as four little-endian bytes. The device alone
/// decides whether a value is acceptable, so any `u32` is a valid `Pin`.
///
/// `Debug` output is redacted:
///
/// ```
/// use radiator_types::Pin;
///
/// let pin = Pin::new(123456);
/// assert_eq!(pin.to_le_bytes(), [0x40, 0xE2, 0x01, 0x00]);
/// assert_eq!(format!("{:?}", pin), "Pin(****)");
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pin(u32);

impl Pin {
    /// Create a PIN from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The numeric PIN value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Serialize the PIN for the login characteristic.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl From<u32> for Pin {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl FromStr for Pin {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// Decode a half-degree byte into degrees Celsius.
#[must_use]
pub fn decode_half_degrees(raw: u8) -> f32 {
    f32::from(raw) / 2.0
}

/// Encode a temperature in degrees Celsius as an unsigned half-degree byte.
///
/// The doubled value is truncated toward zero, so `21.7` encodes as `43`
/// (21.5 °C), never rounded up.
///
/// # Errors
///
/// - [`RequestError::TemperatureOutOfRange`] if the value is not finite or
///   does not fit in `0.0..=127.5`
/// - [`RequestError::TemperatureReserved`] if the value lands on
///   [`NO_CHANGE`] (`64.0..64.5`), which the device would ignore
pub fn encode_temperature(celsius: f64) -> Result<u8, RequestError> {
    let half = (celsius * 2.0).trunc();
    if !half.is_finite() || !(0.0..=f64::from(u8::MAX)).contains(&half) {
        return Err(RequestError::TemperatureOutOfRange(celsius));
    }
    let byte = half as u8;
    if byte == NO_CHANGE {
        return Err(RequestError::TemperatureReserved(celsius));
    }
    Ok(byte)
}

/// Encode a calibration offset as a two's-complement half-degree byte.
///
/// Negative offsets wrap modulo 256: `-2.5` becomes `-5`, sent as `251`.
/// `-64.0` would wrap to [`NO_CHANGE`], so the range stops at `-63.5`.
///
/// # Errors
///
/// Returns [`RequestError::OffsetOutOfRange`] if the value is not finite or
/// does not fit in `-63.5..=63.5`.
pub fn encode_offset(celsius: f64) -> Result<u8, RequestError> {
    let half = (celsius * 2.0).trunc();
    if !half.is_finite() || !(-f64::from(i8::MAX)..=f64::from(i8::MAX)).contains(&half) {
        return Err(RequestError::OffsetOutOfRange(celsius));
    }
    Ok(half as i8 as u8)
}

/// Semantic view of the 7-byte control record.
///
/// Temperatures are in degrees Celsius with 0.5 °C resolution. The
/// open-window parameters are raw counts.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlRecord {
    /// Measured temperature.
    pub current_temperature: f32,
    /// User-set target temperature.
    pub manual_setpoint: f32,
    /// Scheduled low target temperature.
    pub low_auto_setpoint: f32,
    /// Scheduled high target temperature.
    pub high_auto_setpoint: f32,
    /// Sensor calibration offset, decoded as an unsigned half-degree byte.
    pub calibration_offset: f32,
    /// Open-window detection sampling interval.
    pub open_window_interval: u8,
    /// Open-window detection duration.
    pub open_window_duration: u8,
}

impl ControlRecord {
    /// Decode a control record.
    ///
    /// Every byte value is accepted: the device is the only producer of this
    /// payload.
    ///
    /// ```
    /// use radiator_types::ControlRecord;
    ///
    /// let record = ControlRecord::decode(&[40, 42, 20, 28, 5, 10, 15]);
    /// assert_eq!(record.current_temperature, 20.0);
    /// assert_eq!(record.manual_setpoint, 21.0);
    /// assert_eq!(record.calibration_offset, 2.5);
    /// assert_eq!(record.open_window_duration, 15);
    /// ```
    #[must_use]
    pub fn decode(raw: &[u8; RECORD_LEN]) -> Self {
        use bytes::Buf;

        let mut buf = &raw[..];
        Self {
            current_temperature: decode_half_degrees(buf.get_u8()),
            manual_setpoint: decode_half_degrees(buf.get_u8()),
            low_auto_setpoint: decode_half_degrees(buf.get_u8()),
            high_auto_setpoint: decode_half_degrees(buf.get_u8()),
            calibration_offset: decode_half_degrees(buf.get_u8()),
            open_window_interval: buf.get_u8(),
            open_window_duration: buf.get_u8(),
        }
    }

    /// Decode a control record from a slice read off the wire.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidLength`] unless `data` is exactly
    /// [`RECORD_LEN`] bytes long.
    #[must_use = "parsing returns a Result that should be handled"]
    pub fn from_bytes(data: &[u8]) -> ParseResult<Self> {
        let raw: &[u8; RECORD_LEN] = data.try_into().map_err(|_| ParseError::InvalidLength {
            expected: RECORD_LEN,
            actual: data.len(),
        })?;
        Ok(Self::decode(raw))
    }

    /// The calibration offset read as a signed half-degree value.
    ///
    /// The device stores negative offsets in two's complement, so a raw `251`
    /// is `-2.5` here while [`calibration_offset`](Self::calibration_offset)
    /// reports `125.5`.
    #[must_use]
    pub fn calibration_offset_signed(&self) -> f32 {
        let raw = (self.calibration_offset * 2.0) as u8;
        f32::from(raw as i8) / 2.0
    }
}

/// A requested change to the control record.
///
/// At least one of `temperature` and `offset` must be set for the request to
/// encode.
///
/// ```
/// use radiator_types::ControlWrite;
///
/// let bytes = ControlWrite::new().temperature(21.0).encode().unwrap();
/// assert_eq!(bytes, [128, 42, 42, 42, 128, 128, 128]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlWrite {
    /// New manual temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// New calibration offset in degrees Celsius.
    pub offset: Option<f64>,
}

impl ControlWrite {
    /// An empty request. Set at least one field before encoding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the new manual temperature.
    #[must_use]
    pub fn temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(celsius);
        self
    }

    /// Set the new calibration offset.
    #[must_use]
    pub fn offset(mut self, celsius: f64) -> Self {
        self.offset = Some(celsius);
        self
    }

    /// Whether the request carries nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.offset.is_none()
    }

    /// Encode the request as a write record.
    ///
    /// A temperature is written to the manual, low and high slots together.
    /// The measured temperature and open-window slots are always
    /// [`NO_CHANGE`].
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Empty`] when neither field is set, or the
    /// range error of the first field that cannot be encoded.
    pub fn encode(&self) -> Result<[u8; RECORD_LEN], RequestError> {
        if self.is_empty() {
            return Err(RequestError::Empty);
        }

        let mut record = [NO_CHANGE; RECORD_LEN];
        if let Some(celsius) = self.temperature {
            let encoded = encode_temperature(celsius)?;
            record[MANUAL_SETPOINT_INDEX] = encoded;
            record[LOW_AUTO_SETPOINT_INDEX] = encoded;
            record[HIGH_AUTO_SETPOINT_INDEX] = encoded;
        }
        if let Some(celsius) = self.offset {
            record[CALIBRATION_OFFSET_INDEX] = encode_offset(celsius)?;
        }
        Ok(record)
    }
}

/// Encode a write record from an optional temperature and offset.
///
/// Shorthand for building a [`ControlWrite`] and calling
/// [`ControlWrite::encode`].
///
/// # Errors
///
/// See [`ControlWrite::encode`].
pub fn encode_write(
    temperature: Option<f64>,
    offset: Option<f64>,
) -> Result<[u8; RECORD_LEN], RequestError> {
    ControlWrite {
        temperature,
        offset,
    }
    .encode()
}
