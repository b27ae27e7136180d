//! In-memory upstream sources. They serve canned records, count calls and can simulate paging,
//! endless paging and failures.

use crate::error::{UpstreamError, UpstreamResult};
use crate::transit::model::{
    CoordinatesRecord, JourneyRecord, JourneysRecord, LegRecord, LineRecord, LocationRecord, PriceRecord,
    ProductsRecord, RemarkRecord,
};
use crate::transit::{JourneyRequest, TransitSource};
use crate::weather::model::{DailyRecord, ForecastRecord};
use crate::weather::WeatherSource;
use async_trait::async_trait;
use hashbrown::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const PAGE_PREFIX: &str = "page-";

pub enum Products {
    Trains,
    LocalOnly,
}

pub fn location(id: &str, name: &str, products: Products) -> LocationRecord {
    let products = match products {
        Products::Trains => ProductsRecord {
            national_express: Some(true),
            regional: Some(true),
            suburban: Some(true),
            ..Default::default()
        },
        Products::LocalOnly => ProductsRecord {
            bus: Some(true),
            tram: Some(true),
            subway: Some(true),
            ..Default::default()
        },
    };

    LocationRecord {
        id: Some(id.to_owned()),
        name: Some(name.to_owned()),
        kind: Some("station".to_owned()),
        location: Some(CoordinatesRecord { latitude: Some(52.5), longitude: Some(13.4) }),
        products: Some(products),
    }
}

/// A direct journey on a single line
pub fn journey(departure: &str, arrival: &str, line: &str) -> JourneyRecord {
    JourneyRecord {
        legs: vec![LegRecord {
            departure: Some(departure.to_owned()),
            arrival: Some(arrival.to_owned()),
            line: Some(LineRecord { name: Some(line.to_owned()), product_name: None }),
        }],
        remarks: Vec::new(),
        price: None,
    }
}

/// A journey with `transfers` changes between departure and arrival, a fare and some remarks
pub fn journey_with(
    departure: &str,
    arrival: &str,
    transfers: usize,
    fare: Option<f64>,
    remarks: usize,
) -> JourneyRecord {
    let mut record = journey(departure, arrival, "ICE");
    for _ in 0..transfers {
        record.legs.push(LegRecord {
            departure: None,
            arrival: Some(arrival.to_owned()),
            line: None,
        });
    }
    record.price = fare.map(|amount| PriceRecord { amount: Some(amount), currency: Some("EUR".to_owned()) });
    record.remarks = (0..remarks).map(|_| RemarkRecord { kind: Some("warning".to_owned()) }).collect();
    record
}

struct Route {
    pages: Vec<Vec<JourneyRecord>>,
    endless: bool,
}

#[derive(Default)]
pub struct FakeTransitSource {
    locations: Vec<LocationRecord>,
    answer_every_query: bool,
    routes: Mutex<HashMap<(String, String), Route>>,
    failing_routes: Mutex<HashSet<(String, String)>>,
    location_calls: AtomicUsize,
    last_location_results: Mutex<Option<usize>>,
    journey_calls: AtomicUsize,
}

impl FakeTransitSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, record: LocationRecord) -> Self {
        self.locations.push(record);
        self
    }

    /// Return all locations for any query instead of only those whose name or id matches
    pub fn answering_every_query(mut self) -> Self {
        self.answer_every_query = true;
        self
    }

    /// Journeys from `from` to `to`, served page by page
    pub fn add_route(&self, from: &str, to: &str, pages: Vec<Vec<JourneyRecord>>) {
        self.insert_route(from, to, Route { pages, endless: false });
    }

    /// A route that hands out the same page with a fresh cursor forever
    pub fn add_endless_route(&self, from: &str, to: &str, page: Vec<JourneyRecord>) {
        self.insert_route(from, to, Route { pages: vec![page], endless: true });
    }

    pub fn fail_route(&self, from: &str, to: &str) {
        if let Ok(mut failing) = self.failing_routes.lock() {
            failing.insert((from.to_owned(), to.to_owned()));
        }
    }

    pub fn location_calls(&self) -> usize {
        self.location_calls.load(Ordering::SeqCst)
    }

    pub fn last_location_results(&self) -> Option<usize> {
        self.last_location_results.lock().ok().and_then(|results| *results)
    }

    pub fn journey_calls(&self) -> usize {
        self.journey_calls.load(Ordering::SeqCst)
    }

    pub fn upstream_calls(&self) -> usize {
        self.location_calls() + self.journey_calls()
    }

    fn insert_route(&self, from: &str, to: &str, route: Route) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert((from.to_owned(), to.to_owned()), route);
        }
    }

    fn matches(&self, record: &LocationRecord, query: &str) -> bool {
        if self.answer_every_query {
            return true;
        }
        let query = query.to_lowercase();
        let id_matches = record.id.as_deref().is_some_and(|id| id.to_lowercase() == query);
        let name_matches = record.name.as_deref().is_some_and(|name| name.to_lowercase().contains(&query));
        id_matches || name_matches
    }
}

#[async_trait]
impl TransitSource for FakeTransitSource {
    async fn locations(&self, query: &str, results: usize) -> UpstreamResult<Vec<LocationRecord>> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_location_results.lock() {
            *last = Some(results);
        }

        Ok(self.locations.iter()
            .filter(|record| self.matches(record, query))
            .take(results)
            .cloned()
            .collect())
    }

    async fn journeys(&self, request: &JourneyRequest) -> UpstreamResult<JourneysRecord> {
        let call = self.journey_calls.fetch_add(1, Ordering::SeqCst);
        let key = (request.from.to_string(), request.to.to_string());

        let failing = self.failing_routes.lock().map(|failing| failing.contains(&key)).unwrap_or(false);
        if failing {
            return Err(UpstreamError::Status { service: "Transit", status: 502 });
        }

        let routes = self.routes.lock().map_err(|_| UpstreamError::Status { service: "Transit", status: 500 })?;
        let Some(route) = routes.get(&key) else {
            return Ok(JourneysRecord::default());
        };

        if route.endless {
            return Ok(JourneysRecord {
                journeys: route.pages.first().cloned().unwrap_or_default(),
                later_ref: Some(format!("{}{}", PAGE_PREFIX, call + 1)),
            });
        }

        let index = request.later_ref.as_deref()
            .and_then(|later_ref| later_ref.strip_prefix(PAGE_PREFIX))
            .and_then(|index| index.parse::<usize>().ok())
            .unwrap_or(0);

        let journeys = route.pages.get(index).cloned().unwrap_or_default();
        let later_ref = (index + 1 < route.pages.len()).then(|| format!("{}{}", PAGE_PREFIX, index + 1));
        Ok(JourneysRecord { journeys, later_ref })
    }
}

/// A forecast series, one `(date, max temperature, max precipitation probability)` per day
pub fn forecast(days: &[(&str, f64, f64)]) -> ForecastRecord {
    ForecastRecord {
        daily: Some(DailyRecord {
            time: days.iter().map(|(date, _, _)| date.to_string()).collect(),
            temperature_2m_max: days.iter().map(|(_, temp, _)| Some(*temp)).collect(),
            precipitation_probability_max: days.iter().map(|(_, _, precip)| Some(*precip)).collect(),
        }),
    }
}

pub struct FakeWeatherSource {
    forecast: Option<ForecastRecord>,
    calls: AtomicUsize,
}

impl FakeWeatherSource {
    pub fn new(forecast: ForecastRecord) -> Self {
        Self { forecast: Some(forecast), calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { forecast: None, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for FakeWeatherSource {
    async fn daily_forecast(&self, _latitude: f64, _longitude: f64) -> UpstreamResult<ForecastRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.forecast.clone().ok_or(UpstreamError::Status { service: "Weather", status: 503 })
    }
}
