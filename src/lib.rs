// Public modules
pub mod bus;
pub mod config;
pub mod decode;
pub mod errors;
pub mod messages;
pub mod registers;
pub mod registry;
pub mod scheduler;
pub mod sensors;

// Re-export commonly used types
pub use bus::{BusSelector, RegisterBus};
pub use config::{load_bus_config, load_sensor_config, BusConfig, SensorConfig};
pub use errors::{BusError, SensorError, SensorResult};
pub use registry::{init_all, init_from_dir};
pub use scheduler::spawn_sensor_tasks;
pub use sensors::l3gd20::{FullScaleRange, GyroCalibration, L3gd20};
pub use sensors::lps331ap::Lps331ap;

use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initialize tracing; `RUST_LOG` picks the filter, INFO when unset
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Run the sensor hub with the given configuration directory.
///
/// Samples are printed to stdout as one JSON object per line until Ctrl-C.
pub async fn run_sensor_hub(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("[SensorHub] starting up...");

    let (sensor_config, sensors) = init_from_dir(config_path)?;
    info!("[registry] sensors initialized");

    let (tx, mut rx) = mpsc::channel(64);
    let handles = spawn_sensor_tasks(sensors, &sensor_config, tx);
    info!("[main] {} sensor task(s) launched", handles.len());

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(msg) => match msg.to_json() {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("[{}] Failed to encode message: {}", msg.sensor_id(), e),
                },
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("[main] shutting down");
                break;
            }
        }
    }

    drop(rx);
    for handle in handles {
        handle.abort();
    }
    Ok(())
}
