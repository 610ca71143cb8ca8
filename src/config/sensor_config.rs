use crate::errors::{ConfigError, ConfigResult};
use crate::sensors::l3gd20::FullScaleRange;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;

/// Highest poll rate a sensor may request; one tick per microsecond
pub const MAX_FREQUENCY_HZ: u32 = 1_000_000;

/// Root configuration struct expecting `[[sensor]]` TOML array format
#[derive(Debug, Deserialize)]
pub struct SensorConfig {
    #[serde(rename = "sensor")]
    pub sensors: Vec<SensorEntry>,
}

/// One sensor entry, matching each `[[sensor]]` section
#[derive(Debug, Clone, Deserialize)]
pub struct SensorEntry {
    pub id: String,
    pub driver: String,
    pub bus: String,
    /// Falls back to the driver's default address
    pub address: Option<u8>,
    /// Poll rate in Hz
    pub frequency: Option<u32>,
    /// Gyroscope full-scale range
    pub range: Option<FullScaleRange>,
    /// Gyroscope zero-rate offsets (x, y, z) in degrees/s
    pub calibration: Option<[f64; 3]>,
}

impl SensorEntry {
    /// Poll rate, 1 Hz unless configured
    pub fn frequency_hz(&self) -> u32 {
        self.frequency.unwrap_or(1)
    }
}

/// Parse and validate sensor config text
pub fn parse_sensor_config(content: &str) -> ConfigResult<SensorConfig> {
    let parsed: SensorConfig = toml::from_str(content)?;

    let mut seen = HashSet::new();
    for s in &parsed.sensors {
        if !seen.insert(s.id.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "sensor.id".to_string(),
                reason: format!("duplicate sensor id '{}'", s.id),
            });
        }
        if let Some(frequency) = s.frequency {
            if frequency == 0 || frequency > MAX_FREQUENCY_HZ {
                return Err(ConfigError::InvalidValue {
                    field: format!("sensor.{}.frequency", s.id),
                    reason: format!("{} Hz is outside 1..={} Hz", frequency, MAX_FREQUENCY_HZ),
                });
            }
        }
        if let Some(address) = s.address {
            if address > 0x7F {
                return Err(ConfigError::InvalidValue {
                    field: format!("sensor.{}.address", s.id),
                    reason: format!("{:#04x} is not a 7-bit address", address),
                });
            }
        }
    }
    Ok(parsed)
}

/// Loads config from TOML file
pub fn load_sensor_config(path: &str) -> ConfigResult<SensorConfig> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::LoadError {
        path: path.to_string(),
        source,
    })?;
    parse_sensor_config(&content)
}
