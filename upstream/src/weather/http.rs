use crate::client::client_builder;
use crate::error::{UpstreamError, UpstreamResult};
use crate::weather::model::ForecastRecord;
use crate::weather::{WeatherSource, FORECAST_DAYS};
use async_trait::async_trait;
use common::types::config::UpstreamConfig;
use common::util::time::SERVICE_TIMEZONE;
use log::debug;
use url::Url;

const SERVICE: &str = "Weather";
const DAILY_VARIABLES: &str = "temperature_2m_max,precipitation_probability_max";

/// A `WeatherSource` backed by an Open-Meteo style forecast endpoint. `base_url` is the full
/// forecast endpoint, not just the host.
pub struct HttpWeatherSource {
    client: reqwest::Client,
    forecast_url: Url,
}

impl HttpWeatherSource {
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        Ok(Self::with_client(client_builder(config).build()?, config))
    }

    pub(crate) fn with_client(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            forecast_url: config.base_url.clone(),
        }
    }
}

/// Daily values in local service time, so the series lines up with local calendar days
fn forecast_query(latitude: f64, longitude: f64) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", latitude.to_string()),
        ("longitude", longitude.to_string()),
        ("daily", DAILY_VARIABLES.to_owned()),
        ("timezone", SERVICE_TIMEZONE.name().to_owned()),
        ("forecast_days", FORECAST_DAYS.to_string()),
    ]
}

#[async_trait]
impl WeatherSource for HttpWeatherSource {
    async fn daily_forecast(&self, latitude: f64, longitude: f64) -> UpstreamResult<ForecastRecord> {
        let query = forecast_query(latitude, longitude);
        debug!(target: "weather", "GET {} {:?}", self.forecast_url, query);

        let response = self.client.get(self.forecast_url.clone()).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { service: SERVICE, status: status.as_u16() });
        }

        Ok(response.json().await?)
    }
}
