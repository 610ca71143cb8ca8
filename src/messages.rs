use serde::{Deserialize, Serialize};

use crate::sensors::SensorDataFrame;

/// Header metadata common to all sensor messages
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Header {
    /// Unique device identifier
    pub device_id: String,
    /// Sensor identifier from the sensor config (e.g., "gyro0", "baro0")
    pub sensor_id: String,
    /// Reference frame identifier
    pub frame_id: String,
    /// Sequence number for message ordering
    pub seq: u64,
    /// UTC timestamp in nanoseconds
    pub t_utc_ns: u64,
    /// Message schema version for evolution
    pub schema_v: u16,
}

impl Header {
    /// Create a new header stamped with the current UTC time
    pub fn new(device_id: String, sensor_id: String, frame_id: String, seq: u64) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let now_utc = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        Self {
            device_id,
            sensor_id,
            frame_id,
            seq,
            t_utc_ns: now_utc,
            schema_v: 1,
        }
    }
}

/// Gyroscope sample
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GyroMessage {
    pub h: Header,
    /// Angular velocity X-axis (deg/s)
    pub gx: f32,
    /// Angular velocity Y-axis (deg/s)
    pub gy: f32,
    /// Angular velocity Z-axis (deg/s)
    pub gz: f32,
    /// Die temperature (°C)
    pub temperature: Option<f32>,
}

/// Barometer sample
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BarometerMessage {
    pub h: Header,
    /// Pressure (Pa)
    pub pressure: f32,
    /// Temperature (°C)
    pub temperature: Option<f32>,
    /// Altitude from the standard atmosphere (m)
    pub altitude: f32,
}

/// Unified message type for all sensor data
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type")]
pub enum SensorMessage {
    Gyro(GyroMessage),
    Barometer(BarometerMessage),
}

/// Standard-atmosphere altitude for a pressure in Pa
pub fn pressure_altitude(pressure: f32) -> f32 {
    // h = 44330 * (1 - (P/P0)^0.1903)
    if pressure > 0.0 {
        44330.0 * (1.0 - (pressure / 101325.0).powf(0.1903))
    } else {
        0.0
    }
}

impl SensorMessage {
    /// Split a frame into one message per measurement kind present
    pub fn from_frame(header: Header, frame: &SensorDataFrame) -> Vec<SensorMessage> {
        let mut messages = Vec::new();

        if let Some(gyro) = frame.gyro {
            messages.push(SensorMessage::Gyro(GyroMessage {
                h: header.clone(),
                gx: gyro[0],
                gy: gyro[1],
                gz: gyro[2],
                temperature: frame.temp,
            }));
        }

        if let Some(pressure) = frame.pressure {
            messages.push(SensorMessage::Barometer(BarometerMessage {
                h: header,
                pressure,
                temperature: frame.temp,
                altitude: pressure_altitude(pressure),
            }));
        }

        messages
    }

    /// Get the header from any sensor message
    pub fn header(&self) -> &Header {
        match self {
            SensorMessage::Gyro(msg) => &msg.h,
            SensorMessage::Barometer(msg) => &msg.h,
        }
    }

    /// Get the sensor ID from any sensor message
    pub fn sensor_id(&self) -> &str {
        &self.header().sensor_id
    }

    /// Serialize to a single JSON line
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
