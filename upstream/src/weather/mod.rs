mod http;
pub mod model;

use crate::error::UpstreamResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use common::types::weather::WeatherSnapshot;
use common::util::time::iso_date;
use log::warn;
use model::ForecastRecord;
use std::sync::Arc;

pub use http::HttpWeatherSource;

/// Number of days the forecast covers, today included
pub const FORECAST_DAYS: u32 = 8;

/// Raw access to a daily forecast API
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn daily_forecast(&self, latitude: f64, longitude: f64) -> UpstreamResult<ForecastRecord>;
}

#[derive(Clone)]
pub struct WeatherClient {
    source: Arc<dyn WeatherSource>,
}

impl WeatherClient {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    /// Forecast for one location and day. Never fails: weather is only advisory, so any upstream
    /// problem yields an unknown snapshot.
    pub async fn fetch_daily_forecast(&self, latitude: f64, longitude: f64, date: NaiveDate) -> WeatherSnapshot {
        match self.source.daily_forecast(latitude, longitude).await {
            Ok(forecast) => forecast.snapshot_for(&iso_date(date)),
            Err(err) => {
                warn!(target: "weather", "Forecast for ({}, {}) unavailable: {}", latitude, longitude, err);
                WeatherSnapshot::unknown()
            }
        }
    }
}
