//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use radiator_core::{CharacteristicHandle, FirmwareProfile, Pin};

use crate::cli::OutputFormat;

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default device address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,

    /// Default login PIN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<u32>,

    /// Connection timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Default output format ("text", "terse" or "json")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Characteristic overrides for other firmware revisions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileConfig>,
}

/// `[profile]` table: any field left out keeps its built-in value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_handle: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_uuid: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_handle: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_uuid: Option<Uuid>,
}

impl ProfileConfig {
    /// Apply the overrides on top of `base`.
    pub fn apply(&self, mut base: FirmwareProfile) -> FirmwareProfile {
        if let Some(handle) = self.login_handle {
            base.login.handle = CharacteristicHandle::new(handle);
        }
        if let Some(uuid) = self.login_uuid {
            base.login.uuid = uuid;
        }
        if let Some(handle) = self.control_handle {
            base.control.handle = CharacteristicHandle::new(handle);
        }
        if let Some(uuid) = self.control_uuid {
            base.control.uuid = uuid;
        }
        base
    }
}

impl Config {
    /// Get config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("radiator")
            .join("config.toml")
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`. A missing file is an empty config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Firmware profile with the `[profile]` overrides applied.
    pub fn firmware_profile(&self) -> FirmwareProfile {
        match &self.profile {
            Some(overrides) => overrides.apply(FirmwareProfile::default()),
            None => FirmwareProfile::default(),
        }
    }

    /// Render the config as TOML, with the PIN hidden.
    pub fn to_display_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        let has_pin = shown.pin.take().is_some();
        let mut content = toml::to_string_pretty(&shown).context("Failed to serialize config")?;
        if has_pin {
            content.push_str("# pin is set (hidden)\n");
        }
        Ok(content)
    }
}

/// Resolve device from arg (or env var, via clap) or config.
pub fn resolve_device(device: Option<String>, config: &Config) -> Option<String> {
    device
        .filter(|d| !d.trim().is_empty())
        .or_else(|| config.device.clone())
}

/// Resolve PIN from arg (or env var, via clap) or config.
pub fn resolve_pin(pin: Option<u32>, config: &Config) -> Option<Pin> {
    pin.or(config.pin).map(Pin::new)
}

/// Resolve timeout: use provided value, fall back to config.
pub fn resolve_timeout(timeout: Option<u64>, config: &Config) -> Option<u64> {
    timeout.or(config.timeout)
}

/// Resolve output format: use provided value, fall back to config, then text.
pub fn resolve_format(format: Option<OutputFormat>, config: &Config) -> Result<OutputFormat> {
    if let Some(format) = format {
        return Ok(format);
    }
    match &config.format {
        Some(name) => OutputFormat::from_str(name, true)
            .map_err(|_| anyhow::anyhow!("Invalid format in config: {}", name)),
        None => Ok(OutputFormat::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radiator_core::gatt::{CONTROL_RECORD, LOGIN, LOGIN_HANDLE};

    #[test]
    fn test_resolve_device_prefers_arg() {
        let config = Config {
            device: Some("config-device".to_string()),
            ..Default::default()
        };
        let result = resolve_device(Some("arg-device".to_string()), &config);
        assert_eq!(result, Some("arg-device".to_string()));
    }

    #[test]
    fn test_resolve_device_falls_back_to_config() {
        let config = Config {
            device: Some("config-device".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_device(None, &config),
            Some("config-device".to_string())
        );
        assert_eq!(
            resolve_device(Some("  ".to_string()), &config),
            Some("config-device".to_string())
        );
    }

    #[test]
    fn test_resolve_device_none_when_both_empty() {
        assert_eq!(resolve_device(None, &Config::default()), None);
    }

    #[test]
    fn test_resolve_pin() {
        let config = Config {
            pin: Some(1111),
            ..Default::default()
        };
        assert_eq!(resolve_pin(Some(2222), &config), Some(Pin::new(2222)));
        assert_eq!(resolve_pin(None, &config), Some(Pin::new(1111)));
        assert_eq!(resolve_pin(None, &Config::default()), None);
    }

    #[test]
    fn test_resolve_timeout() {
        let config = Config {
            timeout: Some(60),
            ..Default::default()
        };
        assert_eq!(resolve_timeout(Some(45), &config), Some(45));
        assert_eq!(resolve_timeout(None, &config), Some(60));
        assert_eq!(resolve_timeout(None, &Config::default()), None);
    }

    #[test]
    fn test_resolve_format() {
        let config = Config {
            format: Some("JSON".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_format(Some(OutputFormat::Terse), &config).unwrap(),
            OutputFormat::Terse
        );
        assert_eq!(resolve_format(None, &config).unwrap(), OutputFormat::Json);
        assert_eq!(
            resolve_format(None, &Config::default()).unwrap(),
            OutputFormat::Text
        );

        let bad = Config {
            format: Some("csv".to_string()),
            ..Default::default()
        };
        assert!(resolve_format(None, &bad).is_err());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
device = "AA:BB:CC:DD:EE:FF"
pin = 123456
format = "terse"

[profile]
control_handle = 63
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.device.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(config.pin, Some(123456));

        let profile = config.firmware_profile();
        assert_eq!(profile.control.handle.value(), 63);
        assert_eq!(profile.control.uuid, CONTROL_RECORD);
        assert_eq!(profile.login.handle, LOGIN_HANDLE);
        assert_eq!(profile.login.uuid, LOGIN);
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "pin = \"not a number\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_display_hides_pin() {
        let config = Config {
            device: Some("dev".to_string()),
            pin: Some(123456),
            ..Default::default()
        };
        let shown = config.to_display_toml().unwrap();
        assert!(shown.contains("device = \"dev\""));
        assert!(!shown.contains("123456"));
        assert!(shown.contains("pin is set"));
    }

    #[test]
    fn test_config_path_ends_with_radiator() {
        let path = Config::path();
        assert!(path.ends_with("radiator/config.toml"));
    }
}
