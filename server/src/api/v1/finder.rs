use crate::api::v1::errors::ApiError;
use crate::api::v1::messages::{Lang, Message};
use crate::api::v1::types::queries::{parse_departure, parse_float, parse_int, trimmed, FinderParams, Mode};
use crate::api::v1::types::responses::{
    FinderBody, LastTrainResponse, RatedJourney, StationsResponse, WeekendResponse,
};
use crate::AppData;
use axum::extract::{RawQuery, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, SecondsFormat, Utc};
use common::types::StationId;
use common::util::time::local_day;
use futures::FutureExt;
use log::{debug, error};
use routing::queries::last_departure::find_last_departure;
use routing::queries::weekend::{rank_weekend_trips, WeekendQuery};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use upstream::transit::MIN_QUERY_CHARS;

pub const DEFAULT_STATION_LIMIT: usize = 8;
pub const MAX_STATION_LIMIT: i64 = 15;

/// How long shared caches may keep a successful answer. Searches and weekend plans are expensive
/// and change slowly, departures go stale sooner.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CacheHint {
    Search,
    Departures,
}

impl CacheHint {
    pub fn header_value(self) -> &'static str {
        match self {
            CacheHint::Search => "public, s-maxage=300, stale-while-revalidate=3600",
            CacheHint::Departures => "public, s-maxage=180, stale-while-revalidate=1200",
        }
    }
}

#[derive(Debug)]
pub struct FinderOutput {
    pub body: FinderBody,
    pub cache: Option<CacheHint>,
}

impl IntoResponse for FinderOutput {
    fn into_response(self) -> Response {
        match self.cache {
            Some(cache) => ([(header::CACHE_CONTROL, cache.header_value())], Json(self.body)).into_response(),
            None => Json(self.body).into_response(),
        }
    }
}

pub(crate) async fn endpoint(
    State(app_data): State<Arc<AppData>>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = FinderParams::from_query(query.as_deref());
    let lang = Lang::from_param(params.lang.as_deref());
    debug!(target: "server", "Finder request in mode {:?}", params.mode);

    // Whatever goes wrong in here, the caller gets an answer
    let result = AssertUnwindSafe(dispatch(&app_data, params, Utc::now()))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            error!(target: "server", "Finder request panicked");
            Err(ApiError::Busy)
        });

    match result {
        Ok(output) => output.into_response(),
        Err(err) => {
            debug!(target: "server", "Finder request failed: {}", err);
            err.into_response_in(lang)
        }
    }
}

pub async fn dispatch(
    app_data: &AppData,
    params: FinderParams,
    now: DateTime<Utc>,
) -> Result<FinderOutput, ApiError> {
    match Mode::from_param(params.mode.as_deref()) {
        Some(Mode::Stations) => stations(app_data, &params).await,
        Some(Mode::LastTrain) => last_train(app_data, &params, now).await,
        Some(Mode::Weekend) => weekend(app_data, &params, now).await,
        None => Err(ApiError::BadRequest(Message::InvalidMode)),
    }
}

async fn stations(app_data: &AppData, params: &FinderParams) -> Result<FinderOutput, ApiError> {
    let query = trimmed(&params.q);
    let limit = parse_int(&params.limit)
        .map_or(DEFAULT_STATION_LIMIT, |limit| limit.clamp(1, MAX_STATION_LIMIT) as usize);

    if query.chars().count() < MIN_QUERY_CHARS {
        return Ok(FinderOutput {
            body: FinderBody::Stations(StationsResponse { mode: "stations", query: None, items: Vec::new() }),
            cache: None,
        });
    }

    let items = app_data.transit.search_stations(query, limit).await?;

    Ok(FinderOutput {
        body: FinderBody::Stations(StationsResponse {
            mode: "stations",
            query: Some(query.to_owned()),
            items,
        }),
        cache: Some(CacheHint::Search),
    })
}

async fn last_train(app_data: &AppData, params: &FinderParams, now: DateTime<Utc>) -> Result<FinderOutput, ApiError> {
    let from_id = trimmed(&params.from_id);
    let to_id = trimmed(&params.to_id);

    if from_id.is_empty() || to_id.is_empty() {
        return Err(ApiError::BadRequest(Message::MissingStations));
    }
    if from_id == to_id {
        return Err(ApiError::BadRequest(Message::IdenticalStations));
    }

    let reference = parse_departure(&params.departure, now);

    let (from_id, to_id) = (StationId::from(from_id), StationId::from(to_id));
    let (from, to) = futures::try_join!(
        app_data.transit.resolve_station(&from_id),
        app_data.transit.resolve_station(&to_id),
    )?;
    let (Some(from), Some(to)) = (from, to) else {
        return Err(ApiError::BadRequest(Message::UnresolvableStation));
    };

    let output = find_last_departure(&app_data.transit, &from, &to, reference).await?;

    let destination_weather = app_data.weather
        .fetch_daily_forecast(to.latitude, to.longitude, local_day(&output.best.arrival))
        .await;

    Ok(FinderOutput {
        body: FinderBody::LastTrain(LastTrainResponse {
            mode: "last-train",
            from: from.summary(),
            to: to.summary(),
            selected_departure_iso: reference.to_rfc3339_opts(SecondsFormat::Millis, true),
            best_journey: RatedJourney {
                risk: output.best.risk(),
                journey: output.best,
            },
            alternatives: output.alternatives,
            destination_weather,
        }),
        cache: Some(CacheHint::Departures),
    })
}

async fn weekend(app_data: &AppData, params: &FinderParams, now: DateTime<Utc>) -> Result<FinderOutput, ApiError> {
    let origin_id = trimmed(&params.origin_id);
    if origin_id.is_empty() {
        return Err(ApiError::BadRequest(Message::MissingOrigin));
    }

    let query = WeekendQuery::new(
        parse_float(&params.budget),
        parse_float(&params.max_hours),
        params.destination_query.as_deref(),
        parse_int(&params.destination_limit),
    );

    let Some(origin) = app_data.transit.resolve_station(&StationId::from(origin_id)).await? else {
        return Err(ApiError::BadRequest(Message::UnresolvableOrigin));
    };

    let output = rank_weekend_trips(&app_data.transit, &app_data.weather, &origin, &query, now).await?;

    Ok(FinderOutput {
        body: FinderBody::Weekend(WeekendResponse {
            mode: "weekend",
            origin: origin.summary(),
            weekend_window: output.window,
            budget: query.budget,
            max_hours: query.max_hours,
            destination_query: query.destination_query,
            candidate_pool: output.candidate_pool,
            recommendations: output.recommendations,
        }),
        cache: Some(CacheHint::Search),
    })
}
