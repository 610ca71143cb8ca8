use gyrobaro_sensorhub::{config::config_dir, init_tracing, run_sensor_hub};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows bus transfers and register dumps; INFO when unset
    init_tracing();

    // Load configuration from CONFIG_PATH or default
    let config_path = config_dir();
    tracing::info!("[main] Configuration path: {}", config_path);

    run_sensor_hub(&config_path).await
}
