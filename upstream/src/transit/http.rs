use crate::client::{client_builder, join_endpoint};
use crate::error::{UpstreamError, UpstreamResult};
use crate::transit::model::{JourneysRecord, LocationRecord};
use crate::transit::{JourneyRequest, TransitSource};
use async_trait::async_trait;
use chrono::SecondsFormat;
use common::types::config::UpstreamConfig;
use log::{debug, warn};
use url::Url;

const SERVICE: &str = "Transit";

type QueryPairs = Vec<(&'static str, String)>;

/// A `TransitSource` backed by a db-rest style HTTP API (`/locations`, `/journeys`)
pub struct HttpTransitSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransitSource {
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        Ok(Self::with_client(client_builder(config).build()?, config))
    }

    pub(crate) fn with_client(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> UpstreamResult<T> {
        let url = join_endpoint(&self.base_url, path)?;
        debug!(target: "transit", "GET {} {:?}", url, query);

        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "transit", "Upstream answered with status {}", status);
            return Err(UpstreamError::Status { service: SERVICE, status: status.as_u16() });
        }

        Ok(response.json().await?)
    }
}

fn locations_query(query: &str, results: usize) -> QueryPairs {
    vec![("query", query.to_owned()), ("results", results.to_string())]
}

/// A cursor continues an earlier search, so it replaces the departure time if both are set
fn journeys_query(request: &JourneyRequest) -> QueryPairs {
    let mut query = vec![
        ("from", request.from.to_string()),
        ("to", request.to.to_string()),
        ("results", request.results.to_string()),
    ];
    if let Some(later_ref) = &request.later_ref {
        query.push(("laterThan", later_ref.clone()));
    } else if let Some(departure) = request.departure {
        query.push(("departure", departure.to_rfc3339_opts(SecondsFormat::Millis, true)));
    }
    query
}

#[async_trait]
impl TransitSource for HttpTransitSource {
    async fn locations(&self, query: &str, results: usize) -> UpstreamResult<Vec<LocationRecord>> {
        self.get("locations", &locations_query(query, results)).await
    }

    async fn journeys(&self, request: &JourneyRequest) -> UpstreamResult<JourneysRecord> {
        self.get("journeys", &journeys_query(request)).await
    }
}
