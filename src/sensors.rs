use crate::bus::RegisterBus;
use crate::config::SensorEntry;
use crate::errors::{SensorError, SensorResult};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SensorDataFrame {
    /// Angular rate in degrees/s
    pub gyro: Option<[f32; 3]>,
    /// °C
    pub temp: Option<f32>,
    /// Pa
    pub pressure: Option<f32>,
}

/// Object-safe view of a ready driver, used by the polling tasks
pub trait SensorDriver: Send {
    /// Take one complete sample
    fn read(&mut self) -> SensorResult<SensorDataFrame>;
    fn id(&self) -> &str;
}

pub mod l3gd20;
pub mod lps331ap;

/// Default device address for a driver name
pub fn default_address(driver: &str) -> Option<u8> {
    match driver {
        "l3gd20" => Some(l3gd20::DEFAULT_ADDRESS),
        "lps331ap" => Some(lps331ap::DEFAULT_ADDRESS),
        _ => None,
    }
}

/// Build, identify and configure the driver named by `entry` on `bus`
pub fn create_sensor_driver<B>(entry: &SensorEntry, bus: B) -> SensorResult<Box<dyn SensorDriver>>
where
    B: RegisterBus + Send + 'static,
{
    match entry.driver.as_str() {
        "l3gd20" => {
            let mut gyro = l3gd20::L3gd20::new(entry.id.clone(), bus)?;
            if let Some(offset) = entry.calibration {
                gyro = gyro.with_calibration(l3gd20::GyroCalibration { offset });
            }
            gyro.configure(entry.range.unwrap_or_default())?;
            Ok(Box::new(gyro))
        }
        "lps331ap" => {
            if entry.range.is_some() || entry.calibration.is_some() {
                return Err(SensorError::ConfigError {
                    sensor: entry.id.clone(),
                    reason: "range and calibration apply to l3gd20 only".to_string(),
                });
            }
            Ok(Box::new(lps331ap::Lps331ap::new(entry.id.clone(), bus)?))
        }
        _ => Err(SensorError::UnsupportedDriver { driver: entry.driver.clone() }),
    }
}
