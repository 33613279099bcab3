//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sensor wire format name (e.g. "dual-load-cell")
    #[serde(default = "default_format")]
    pub format: String,

    /// Consecutive serial failures tolerated before the logger exits
    #[serde(default = "default_max_transport_failures")]
    pub max_transport_failures: u32,

    /// Serial port configuration
    #[serde(default)]
    pub serial: SerialConfig,

    /// Output file configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Serial port configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device path (e.g. "/dev/ttyACM0")
    #[serde(default = "default_device")]
    pub device: String,

    /// Baud rate (must match the firmware sketch)
    #[serde(default = "default_baud")]
    pub baud: u32,

    /// Per-read timeout in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud: default_baud(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// Output file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// CSV output path, created (or truncated) at startup
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

// Default value functions
fn default_format() -> String {
    "dual-load-cell".to_string()
}

fn default_max_transport_failures() -> u32 {
    10
}

fn default_device() -> String {
    "/dev/ttyACM0".to_string()
}

fn default_baud() -> u32 {
    57600
}

fn default_read_timeout_ms() -> u64 {
    1000
}

fn default_output_path() -> String {
    "loadcell_readings.csv".to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: default_format(),
            max_transport_failures: default_max_transport_failures(),
            serial: SerialConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = toml::from_str(
            r#"
            format = "load-cell-power"

            [serial]
            baud = 9600
            "#,
        )
        .unwrap();

        assert_eq!(config.format, "load-cell-power");
        assert_eq!(config.serial.baud, 9600);
        assert_eq!(config.serial.device, "/dev/ttyACM0");
        assert_eq!(config.output.path, "loadcell_readings.csv");
        assert_eq!(config.max_transport_failures, 10);
    }

    #[test]
    fn test_default_format_is_parseable() {
        use loadcell_telemetry::SensorFormat;

        let config = Config::default();
        assert!(config.format.parse::<SensorFormat>().is_ok());
    }
}
