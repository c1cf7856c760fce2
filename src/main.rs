use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use geoweather::{AppConfig, AppState, telemetry, web};

#[derive(Parser, Debug)]
#[command(name = "geoweather", version, about = "Weather and nearby places for logged-in users")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load_from_path(cli.config).context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    telemetry::init(&config.logging)?;
    tracing::info!(version = geoweather::VERSION, "Starting GeoWeather");

    let state = AppState::new(config).context("Failed to initialize application state")?;
    web::run(state).await
}
