pub mod bus_config;
pub mod sensor_config;

pub use bus_config::{load_bus_config, parse_bus_config, BusConfig, BusEntry};
pub use sensor_config::{load_sensor_config, parse_sensor_config, SensorConfig, SensorEntry};

/// Configuration directory, overridable through `CONFIG_PATH`
pub fn config_dir() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string())
}
