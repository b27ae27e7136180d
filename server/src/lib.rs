mod api;

use axum::routing::get;
use axum::Router;
use log::info;
use std::fmt::Display;
use std::sync::Arc;
use tokio::net::TcpListener;
use upstream::transit::TransitClient;
use upstream::weather::WeatherClient;

pub use api::v1::finder::{dispatch, CacheHint, FinderOutput};
pub use api::v1::types::queries::FinderParams;

/// The upstream clients every request works with
pub struct AppData {
    pub transit: TransitClient,
    pub weather: WeatherClient,
}

impl AppData {
    pub fn new(transit: TransitClient, weather: WeatherClient) -> Self {
        Self { transit, weather }
    }
}

pub fn router(app_data: AppData) -> Router {
    Router::new()
        .route("/api/v1/mobility-finder", get(api::v1::finder::endpoint))
        .with_state(Arc::new(app_data))
}

pub async fn build(
    app_data: AppData,
    listen: &str,
) -> Result<(TcpListener, Router), ServerError> {
    let app = router(app_data);

    let listener = TcpListener::bind(listen).await?;
    info!(target: "server", "Listening on {}", listener.local_addr()?);

    Ok((listener, app))
}

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    Io(#[from] std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::Io(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(test)]
mod tests;
