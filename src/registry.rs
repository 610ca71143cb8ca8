use crate::bus::i2c::I2CBus;
use crate::bus::RegisterBus;
use crate::config::{load_bus_config, load_sensor_config, BusConfig, BusEntry, SensorConfig, SensorEntry};
use crate::errors::{BusError, RegistryError, RegistryResult, SensorError};
use crate::sensors::{create_sensor_driver, default_address, SensorDriver};
use tracing::info;

/// Load `sensors.toml` and `buses.toml` from `config_path` and build every
/// sensor they describe
pub fn init_from_dir(config_path: &str) -> RegistryResult<(SensorConfig, Vec<Box<dyn SensorDriver>>)> {
    let sensor_config = load_sensor_config(&format!("{}/sensors.toml", config_path))?;
    let bus_config = load_bus_config(&format!("{}/buses.toml", config_path))?;
    info!(
        "[config] loaded {} sensor(s) on {} bus(es)",
        sensor_config.sensors.len(),
        bus_config.buses.len()
    );

    let sensors = init_all(&sensor_config, &bus_config)?;
    Ok((sensor_config, sensors))
}

/// Build every configured sensor, each on its own device handle.
///
/// Any failure aborts initialization; a missing or wrong chip is fatal.
pub fn init_all(
    sensor_config: &SensorConfig,
    bus_config: &BusConfig,
) -> RegistryResult<Vec<Box<dyn SensorDriver>>> {
    init_with(sensor_config, bus_config, |bus, address| {
        I2CBus::open(&bus.selector(), address, bus.debug)
    })
}

/// `init_all` with a caller-supplied way of opening a device
pub fn init_with<B, F>(
    sensor_config: &SensorConfig,
    bus_config: &BusConfig,
    mut open: F,
) -> RegistryResult<Vec<Box<dyn SensorDriver>>>
where
    B: RegisterBus + Send + 'static,
    F: FnMut(&BusEntry, u8) -> Result<B, BusError>,
{
    let mut sensors: Vec<Box<dyn SensorDriver>> = Vec::new();
    info!("[registry] initializing {} sensors...", sensor_config.sensors.len());
    for s in sensor_config.sensors.iter() {
        let bus_entry = bus_config
            .find(&s.bus)
            .ok_or_else(|| RegistryError::BusNotFound { bus: s.bus.clone() })?;
        let address = resolve_address(s)?;
        info!(
            "[registry] registering sensor: id={} driver={} bus={} address={:#04x}",
            s.id, s.driver, s.bus, address
        );

        let bus = open(bus_entry, address).map_err(|source| RegistryError::BusOpen {
            bus: s.bus.clone(),
            source,
        })?;
        let sensor = create_sensor_driver(s, bus).map_err(RegistryError::DriverCreation)?;
        sensors.push(sensor);
    }

    Ok(sensors)
}

fn resolve_address(entry: &SensorEntry) -> RegistryResult<u8> {
    entry
        .address
        .or_else(|| default_address(&entry.driver))
        .ok_or_else(|| {
            RegistryError::DriverCreation(SensorError::UnsupportedDriver {
                driver: entry.driver.clone(),
            })
        })
}
