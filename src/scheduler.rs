use crate::config::sensor_config::SensorConfig;
use crate::messages::{Header, SensorMessage};
use crate::sensors::SensorDriver;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

/// Device identifier stamped into every message header
pub const DEVICE_ID: &str = "gyrobaro_hub";

/// Poll each sensor on its own task at its configured frequency and publish
/// the resulting messages on `tx`.
///
/// Reads are blocking bus transfers, so they run on the blocking pool with
/// the driver behind a mutex; one device is never accessed concurrently.
/// Tasks end when the receiving side of `tx` is dropped.
pub fn spawn_sensor_tasks(
    sensors: Vec<Box<dyn SensorDriver>>,
    sensor_config: &SensorConfig,
    tx: mpsc::Sender<SensorMessage>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    for sensor in sensors.into_iter() {
        let sensor_id = sensor.id().to_string();

        let frequency = sensor_config
            .sensors
            .iter()
            .find(|s| s.id == sensor_id)
            .map(|s| s.frequency_hz())
            .unwrap_or(1);
        let period = poll_period(frequency);
        let sensor = Arc::new(Mutex::new(sensor));
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            info!("[{}] Starting sensor task at {}Hz", sensor_id, frequency);
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut sequence_counter = 0u64;

            loop {
                ticker.tick().await;

                let driver = sensor.clone();
                let result = tokio::task::spawn_blocking(move || {
                    let mut guard = driver.lock().unwrap_or_else(PoisonError::into_inner);
                    guard.read()
                })
                .await;

                let frame = match result {
                    Ok(Ok(frame)) => frame,
                    Ok(Err(e)) => {
                        warn!("[{}] Sensor read error: {}", sensor_id, e);
                        continue;
                    }
                    Err(e) => {
                        warn!("[{}] Sensor read task failed: {}", sensor_id, e);
                        continue;
                    }
                };

                sequence_counter += 1;
                let header = Header::new(
                    DEVICE_ID.to_string(),
                    sensor_id.clone(),
                    "sensor_frame".to_string(),
                    sequence_counter,
                );

                for msg in SensorMessage::from_frame(header, &frame) {
                    if tx.send(msg).await.is_err() {
                        info!("[{}] Publisher closed, stopping", sensor_id);
                        return;
                    }
                }
            }
        }));
    }

    handles
}

/// Tick period for `frequency` Hz, never shorter than one microsecond
fn poll_period(frequency: u32) -> Duration {
    Duration::from_micros((1_000_000 / frequency.max(1) as u64).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_sensor_config;
    use crate::config::sensor_config::SensorEntry;
    use crate::errors::{BusError, SensorResult};
    use crate::sensors::SensorDataFrame;

    struct FakeBaro {
        reads: u32,
    }

    impl SensorDriver for FakeBaro {
        fn read(&mut self) -> SensorResult<SensorDataFrame> {
            self.reads += 1;
            if self.reads == 1 {
                return Err(BusError::Transfer { reg: 0x28, reason: "nack".to_string() }.into());
            }
            Ok(SensorDataFrame {
                pressure: Some(101325.0),
                temp: Some(42.5),
                ..Default::default()
            })
        }

        fn id(&self) -> &str {
            "baro0"
        }
    }

    #[test]
    fn test_poll_period_is_never_zero() {
        assert_eq!(poll_period(1), Duration::from_secs(1));
        assert_eq!(poll_period(200), Duration::from_millis(5));
        assert_eq!(poll_period(0), Duration::from_secs(1));
        assert_eq!(poll_period(1_000_000), Duration::from_micros(1));
        assert_eq!(poll_period(u32::MAX), Duration::from_micros(1));
    }

    #[tokio::test]
    async fn test_tasks_publish_and_skip_failed_reads() {
        let config = parse_sensor_config(
            "[[sensor]]\nid = \"baro0\"\ndriver = \"lps331ap\"\nbus = \"i2c1\"\nfrequency = 200\n",
        )
        .unwrap();
        let (tx, mut rx) = mpsc::channel(8);

        let sensor: Box<dyn SensorDriver> = Box::new(FakeBaro { reads: 0 });
        let handles = spawn_sensor_tasks(vec![sensor], &config, tx);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.sensor_id(), "baro0");
        // The failed first read does not consume a sequence number
        assert_eq!(first.header().seq, 1);
        assert_eq!(second.header().seq, 2);
        assert!(matches!(first, SensorMessage::Barometer(_)));

        drop(rx);
        for h in handles {
            h.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_task_survives_frequency_beyond_microsecond_ticks() {
        // Built directly, bypassing config validation
        let config = SensorConfig {
            sensors: vec![SensorEntry {
                id: "baro0".to_string(),
                driver: "lps331ap".to_string(),
                bus: "i2c1".to_string(),
                address: None,
                frequency: Some(2_000_000),
                range: None,
                calibration: None,
            }],
        };
        let (tx, mut rx) = mpsc::channel(8);

        let sensor: Box<dyn SensorDriver> = Box::new(FakeBaro { reads: 0 });
        let handles = spawn_sensor_tasks(vec![sensor], &config, tx);

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.header().seq, 1);

        drop(rx);
        for h in handles {
            h.await.unwrap();
        }
    }
}
