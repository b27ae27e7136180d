pub mod bootstrap_config;
mod config;

use crate::config::{load_config, ConfigError};
use bootstrap_config::BootstrapConfig;
use common::types::config::Config;
use common::util::logging;
use log::{error, info};
use server::{AppData, ServerError};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::signal;
use upstream::transit::{HttpTransitSource, TransitClient};
use upstream::weather::{HttpWeatherSource, WeatherClient};
use upstream::UpstreamError;

#[tokio::main]
async fn main() {
    let _ = run()
        .await
        .inspect_err(|err| error!(target: "main", "{}", err));
}

async fn run() -> Result<(), WegweiserError> {
    let bootstrap_config = BootstrapConfig::read();

    logging::initialize_logging(bootstrap_config.log_level.clone().into())?;
    print_startup_message();

    let config = load_config(&bootstrap_config)?;

    let (listener, app) = match config {
        Config::Version1 { server: server_config, transit, weather } => {
            info!(target: "main", "Transit API at {}, forecasts from {}", transit.base_url, weather.base_url);

            let app_data = AppData::new(
                TransitClient::new(Arc::new(HttpTransitSource::new(&transit)?)),
                WeatherClient::new(Arc::new(HttpWeatherSource::new(&weather)?)),
            );

            logging::run_with_spinner_async("main", "Binding API listener", server::build(app_data, &server_config.listen)).await?
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(target: "main", "API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!(target: "main", "Could not listen for the shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!(target: "main", "Received shutdown signal, finishing open requests");
}

fn print_startup_message() {
    info!("\n                                      _               \n __      _____  __ ___      _____(_)___  ___ _ __ \n \\ \\ /\\ / / _ \\/ _` \\ \\ /\\ / / _ \\ / __|/ _ \\ '__|\n  \\ V  V /  __/ (_| |\\ V  V /  __/ \\__ \\  __/ |   \n   \\_/\\_/ \\___|\\__, | \\_/\\_/ \\___|_|___/\\___|_|   \n               |___/                              \n M O B I L I T Y   F I N D E R\n");
}

#[derive(thiserror::Error, Debug)]
pub enum WegweiserError {
    Logging(#[from] log::SetLoggerError),
    Config(#[from] ConfigError),
    Upstream(#[from] UpstreamError),
    Server(#[from] ServerError),
    IO(#[from] std::io::Error),
}

impl Display for WegweiserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let err: &dyn Display = match self {
            WegweiserError::Logging(err) => err,
            WegweiserError::Config(err) => err,
            WegweiserError::Upstream(err) => err,
            WegweiserError::Server(err) => err,
            WegweiserError::IO(err) => err,
        };
        let prefix = match self {
            WegweiserError::Logging(_) => "Setting up logging",
            WegweiserError::Config(_) => "Reading config file",
            WegweiserError::Upstream(_) => "Creating upstream clients",
            WegweiserError::Server(_) => "Error in server",
            WegweiserError::IO(_) => "Error during IO",
        };
        write!(f, "{}: {}", prefix, err)
    }
}
