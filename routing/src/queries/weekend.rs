//! Ranks weekend trips from one origin: search destination candidates, then fetch outbound and
//! return journeys plus the destination weather for all of them at once, score the survivors and
//! keep the best few.

use crate::errors::{QueryError, QueryResult};
use crate::scoring::{fit_score, FitInput};
use chrono::{DateTime, Datelike, Days, NaiveDate, Timelike, Utc};
use common::types::journey::{Journey, RiskLevel};
use common::types::station::{Station, StationSummary};
use common::types::weather::WeatherSnapshot;
use common::util::time::{local_instant, SERVICE_TIMEZONE};
use futures::future;
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;
use upstream::transit::{TransitClient, SEARCH_MARGIN};
use upstream::weather::WeatherClient;

pub const DEFAULT_BUDGET: f64 = 140.0;
pub const MIN_BUDGET: f64 = 40.0;
pub const MAX_BUDGET: f64 = 500.0;
pub const DEFAULT_MAX_HOURS: f64 = 4.5;
pub const MIN_HOURS: f64 = 1.0;
pub const MAX_HOURS: f64 = 10.0;
pub const DEFAULT_DESTINATION_LIMIT: usize = 8;
pub const MIN_DESTINATION_LIMIT: usize = 4;
pub const MAX_DESTINATION_LIMIT: usize = 10;
/// Matches the main station of almost every German city
pub const FALLBACK_DESTINATION_QUERY: &str = "Hbf";
pub const MAX_RECOMMENDATIONS: usize = 4;

// More stations than needed are asked for upstream, the origin and local-only stops get filtered
// out. The station search itself already adds `SEARCH_MARGIN` of these.
const CANDIDATE_SEARCH_MARGIN: usize = 10;
const JOURNEYS_PER_LEG: usize = 4;
// On Saturdays from this hour on, the weekend after is planned instead
const SATURDAY_CUTOFF_HOUR: u32 = 13;
const OUTBOUND_TIME: (u32, u32) = (8, 30);
const RETURN_TIME: (u32, u32) = (17, 0);

/// The clamped parameters of a weekend search
#[derive(Debug, Clone, PartialEq)]
pub struct WeekendQuery {
    pub budget: f64,
    pub max_hours: f64,
    pub destination_query: String,
    pub destination_limit: usize,
}

impl WeekendQuery {
    /// Missing or non-finite values fall back to their defaults before clamping
    pub fn new(
        budget: Option<f64>,
        max_hours: Option<f64>,
        destination_query: Option<&str>,
        destination_limit: Option<i64>,
    ) -> Self {
        let budget = budget.filter(|budget| budget.is_finite())
            .map_or(DEFAULT_BUDGET, |budget| budget.clamp(MIN_BUDGET, MAX_BUDGET));
        let max_hours = max_hours.filter(|hours| hours.is_finite())
            .map_or(DEFAULT_MAX_HOURS, |hours| hours.clamp(MIN_HOURS, MAX_HOURS));
        let destination_query = destination_query.map(str::trim)
            .filter(|query| !query.is_empty())
            .unwrap_or(FALLBACK_DESTINATION_QUERY)
            .to_owned();
        let destination_limit = destination_limit
            .map_or(DEFAULT_DESTINATION_LIMIT, |limit| {
                limit.clamp(MIN_DESTINATION_LIMIT as i64, MAX_DESTINATION_LIMIT as i64) as usize
            });

        Self { budget, max_hours, destination_query, destination_limit }
    }
}

impl Default for WeekendQuery {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

/// The upcoming weekend: out on Saturday morning, back on Sunday afternoon
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct WeekendWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(skip)]
    pub outbound_departure: DateTime<Utc>,
    #[serde(skip)]
    pub return_departure: DateTime<Utc>,
}

impl WeekendWindow {
    pub fn upcoming(now: DateTime<Utc>) -> Self {
        let local_now = now.with_timezone(&SERVICE_TIMEZONE);
        let weekday = local_now.weekday().num_days_from_sunday();

        let mut days_until_saturday = (6 + 7 - weekday) % 7;
        if days_until_saturday == 0 && local_now.hour() >= SATURDAY_CUTOFF_HOUR {
            days_until_saturday = 7;
        }

        let today = local_now.date_naive();
        let start = today.checked_add_days(Days::new(days_until_saturday.into())).unwrap_or(today);
        let end = start.checked_add_days(Days::new(1)).unwrap_or(start);

        Self {
            start,
            end,
            outbound_departure: local_instant(start, OUTBOUND_TIME.0, OUTBOUND_TIME.1),
            return_departure: local_instant(end, RETURN_TIME.0, RETURN_TIME.1),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WeekendRecommendation {
    pub destination: StationSummary,
    pub outbound: Journey,
    pub inbound: Journey,
    /// Round-trip fare, only known if both legs have one
    pub total_price: Option<f64>,
    pub currency: String,
    pub risk: RiskLevel,
    pub weather: WeatherSnapshot,
    pub fit_score: u32,
}

#[derive(Debug, Clone)]
pub struct WeekendOutput {
    pub window: WeekendWindow,
    /// Number of destinations that were evaluated
    pub candidate_pool: usize,
    pub recommendations: Vec<WeekendRecommendation>,
}

pub async fn rank_weekend_trips(
    transit: &TransitClient,
    weather: &WeatherClient,
    origin: &Station,
    query: &WeekendQuery,
    now: DateTime<Utc>,
) -> QueryResult<WeekendOutput> {
    let window = WeekendWindow::upcoming(now);
    let candidates = find_candidates(transit, origin, query).await?;

    info!(target: "weekend", "Evaluating {} destinations from {} for {}", candidates.len(), origin.id, window.start);

    let evaluations = candidates.iter()
        .map(|destination| evaluate_candidate(transit, weather, origin, destination, &window, query));

    let recommendations = future::join_all(evaluations).await
        .into_iter()
        .flatten()
        .sorted_by(|a, b| b.fit_score.cmp(&a.fit_score))
        .take(MAX_RECOMMENDATIONS)
        .collect_vec();

    if recommendations.is_empty() {
        return Err(QueryError::NoWeekendOptions);
    }

    Ok(WeekendOutput {
        window,
        candidate_pool: candidates.len(),
        recommendations,
    })
}

/// Stations matching the destination query, topped up with main stations if the query alone does
/// not yield enough
async fn find_candidates(
    transit: &TransitClient,
    origin: &Station,
    query: &WeekendQuery,
) -> QueryResult<Vec<Station>> {
    let limit = query.destination_limit;
    let search_limit = limit + CANDIDATE_SEARCH_MARGIN.saturating_sub(SEARCH_MARGIN);

    let mut candidates = transit.search_stations(&query.destination_query, search_limit).await?
        .into_iter()
        .filter(|station| station.id != origin.id)
        .collect_vec();

    if candidates.len() < limit && !query.destination_query.eq_ignore_ascii_case(FALLBACK_DESTINATION_QUERY) {
        debug!(target: "weekend", "Only {} candidates for '{}', adding main stations", candidates.len(), query.destination_query);
        let fallback = transit.search_stations(FALLBACK_DESTINATION_QUERY, search_limit).await?;

        candidates = candidates.into_iter()
            .chain(fallback)
            .filter(|station| station.id != origin.id)
            .unique_by(|station| station.id.clone())
            .collect_vec();
    }

    candidates.truncate(limit);
    Ok(candidates)
}

/// Everything for one destination. Any failure only drops this destination.
async fn evaluate_candidate(
    transit: &TransitClient,
    weather: &WeatherClient,
    origin: &Station,
    destination: &Station,
    window: &WeekendWindow,
    query: &WeekendQuery,
) -> Option<WeekendRecommendation> {
    let legs = future::try_join(
        transit.fetch_journeys(origin, destination, window.outbound_departure, JOURNEYS_PER_LEG),
        transit.fetch_journeys(destination, origin, window.return_departure, JOURNEYS_PER_LEG),
    );
    let forecast = weather.fetch_daily_forecast(destination.latitude, destination.longitude, window.start);

    let (legs, forecast) = future::join(legs, forecast).await;
    let (outbound_journeys, return_journeys) = match legs {
        Ok(legs) => legs,
        Err(err) => {
            debug!(target: "weekend", "Dropping {}: {}", destination.id, err);
            return None;
        }
    };

    let (Some(outbound), Some(inbound)) = (outbound_journeys.into_iter().next(), return_journeys.into_iter().next()) else {
        debug!(target: "weekend", "Dropping {}: no journeys in one direction", destination.id);
        return None;
    };

    let total_price = match (outbound.price_amount, inbound.price_amount) {
        (Some(outbound_fare), Some(inbound_fare)) => Some(((outbound_fare + inbound_fare) * 100.0).round() / 100.0),
        _ => None,
    };
    let transfers = outbound.transfers + inbound.transfers;
    let risk = RiskLevel::assess(transfers, outbound.remark_count + inbound.remark_count);

    let fit_score = fit_score(&FitInput {
        budget: query.budget,
        max_hours: query.max_hours,
        total_price,
        outbound_duration_minutes: outbound.duration_minutes,
        transfers,
        precipitation: forecast.precip_max,
    });

    Some(WeekendRecommendation {
        destination: destination.summary(),
        currency: outbound.currency.clone(),
        outbound,
        inbound,
        total_price,
        risk,
        weather: forecast,
        fit_score,
    })
}
