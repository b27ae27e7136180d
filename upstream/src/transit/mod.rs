mod http;
pub mod model;

use crate::error::UpstreamResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::types::journey::{Journey, JourneyPage};
use common::types::station::Station;
use common::types::StationId;
use hashbrown::HashSet;
use log::debug;
use model::{JourneysRecord, LocationRecord};
use std::sync::Arc;

pub use http::HttpTransitSource;

/// Queries shorter than this never reach the API
pub const MIN_QUERY_CHARS: usize = 2;
/// Extra results requested upstream on every station search, since filtering drops local-only stops
pub const SEARCH_MARGIN: usize = 5;
// The API has no lookup by id, so we search for the id and pick the match out of a few results
const RESOLVE_RESULTS: usize = 8;

/// Raw access to a journey-planning API
#[async_trait]
pub trait TransitSource: Send + Sync {
    async fn locations(&self, query: &str, results: usize) -> UpstreamResult<Vec<LocationRecord>>;

    async fn journeys(&self, request: &JourneyRequest) -> UpstreamResult<JourneysRecord>;
}

/// Parameters of one journey page fetch. If both a departure and a `later_ref` cursor are set, the
/// cursor wins.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyRequest {
    pub from: StationId,
    pub to: StationId,
    pub departure: Option<DateTime<Utc>>,
    pub later_ref: Option<String>,
    pub results: usize,
}

impl JourneyRequest {
    pub fn departing(from: &StationId, to: &StationId, departure: DateTime<Utc>, results: usize) -> Self {
        Self {
            from: from.clone(),
            to: to.clone(),
            departure: Some(departure),
            later_ref: None,
            results,
        }
    }

    /// The same request, continued at the page behind `later_ref`
    pub fn later_than(&self, later_ref: String) -> Self {
        Self {
            later_ref: Some(later_ref),
            ..self.clone()
        }
    }
}

/// Normalizes what a `TransitSource` returns into stations and journeys
#[derive(Clone)]
pub struct TransitClient {
    source: Arc<dyn TransitSource>,
}

impl TransitClient {
    pub fn new(source: Arc<dyn TransitSource>) -> Self {
        Self { source }
    }

    /// Up to `limit` train-served stations matching `query`, deduplicated by id, in upstream order
    pub async fn search_stations(&self, query: &str, limit: usize) -> UpstreamResult<Vec<Station>> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let records = self.source.locations(query, limit + SEARCH_MARGIN).await?;

        let mut seen = HashSet::new();
        let stations: Vec<Station> = records.iter()
            .filter(|record| record.is_station_or_stop())
            .filter_map(LocationRecord::to_station)
            .filter(|station| seen.insert(station.id.clone()))
            .take(limit)
            .collect();

        debug!(target: "transit", "Station search '{}' returned {} of {} records", query, stations.len(), records.len());
        Ok(stations)
    }

    /// Looks a station up by its exact id. Falls back to the first usable result if the id itself is
    /// not among them.
    pub async fn resolve_station(&self, id: &StationId) -> UpstreamResult<Option<Station>> {
        let records = self.source.locations(id.as_str(), RESOLVE_RESULTS).await?;
        let mut candidates = records.iter().filter_map(LocationRecord::to_station);

        let exact = candidates.clone().find(|station| &station.id == id);
        let station = exact.or_else(|| candidates.next());

        if station.is_none() {
            debug!(target: "transit", "Station id '{}' could not be resolved", id);
        }
        Ok(station)
    }

    pub async fn fetch_journey_page(&self, request: &JourneyRequest) -> UpstreamResult<JourneyPage> {
        let record = self.source.journeys(request).await?;

        let journeys = record.journeys.iter()
            .filter_map(|journey| journey.to_journey())
            .collect();

        Ok(JourneyPage {
            journeys,
            later_ref: record.later_ref.filter(|later_ref| !later_ref.is_empty()),
        })
    }

    /// The first page of journeys departing at or after `departure`
    pub async fn fetch_journeys(
        &self,
        from: &Station,
        to: &Station,
        departure: DateTime<Utc>,
        results: usize,
    ) -> UpstreamResult<Vec<Journey>> {
        let request = JourneyRequest::departing(&from.id, &to.id, departure, results);
        Ok(self.fetch_journey_page(&request).await?.journeys)
    }
}
