use thiserror::Error;
use crate::bus::i2c::I2CError;

/// Transport-level failures reported by a `RegisterBus`
#[derive(Error, Debug)]
pub enum BusError {
    #[error("I2C communication failed: {0}")]
    I2c(#[from] I2CError),

    #[error("I2C transfer at register {reg:#04x} failed: {reason}")]
    Transfer { reg: u8, reason: String },

    #[error("I2C block read at register {reg:#04x} returned {actual} byte(s), expected {expected}")]
    ShortRead { reg: u8, expected: usize, actual: usize },

    #[error("I2C not supported on this platform: {0}")]
    Unsupported(String),
}

/// Errors raised by the sensor drivers
#[derive(Error, Debug)]
pub enum SensorError {
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("Sensor '{sensor}' wrong chip ID: expected {expected:#04x}, got {actual:#04x}")]
    IdentityMismatch { sensor: String, expected: u8, actual: u8 },

    #[error("Sensor '{sensor}' read before a full-scale range was configured")]
    NotConfigured { sensor: String },

    #[error("Unsupported sensor driver: '{driver}'")]
    UnsupportedDriver { driver: String },

    #[error("Invalid sensor configuration for '{sensor}': {reason}")]
    ConfigError { sensor: String, reason: String },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration format: {0}")]
    FormatError(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Registry and initialization errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Bus '{bus}' not found in bus configuration")]
    BusNotFound { bus: String },

    #[error("Bus '{bus}' could not be opened: {source}")]
    BusOpen {
        bus: String,
        #[source]
        source: BusError,
    },

    #[error("Failed to create sensor driver: {0}")]
    DriverCreation(#[source] SensorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type aliases for convenience
pub type SensorResult<T> = Result<T, SensorError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mismatch_message() {
        let err = SensorError::IdentityMismatch {
            sensor: "gyro0".to_string(),
            expected: 0xD4,
            actual: 0x00,
        };
        assert_eq!(
            err.to_string(),
            "Sensor 'gyro0' wrong chip ID: expected 0xd4, got 0x00"
        );
    }

    #[test]
    fn test_bus_error_is_transparent() {
        let bus = BusError::Transfer { reg: 0x28, reason: "nack".to_string() };
        let expected = bus.to_string();
        let err: SensorError = bus.into();
        assert_eq!(err.to_string(), expected);
        assert!(matches!(err, SensorError::Bus(BusError::Transfer { reg: 0x28, .. })));
    }
}
