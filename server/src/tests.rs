//! Scenarios over the whole finder facade, backed by in-memory upstreams

use crate::api::v1::errors::ApiError;
use crate::api::v1::finder::{dispatch, endpoint, CacheHint};
use crate::api::v1::messages::{Lang, Message};
use crate::{AppData, FinderParams};
use async_trait::async_trait;
use axum::body::to_bytes;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use upstream::fake::{forecast, journey, journey_with, location, FakeTransitSource, FakeWeatherSource, Products};
use upstream::transit::model::{JourneysRecord, LocationRecord};
use upstream::transit::{JourneyRequest, TransitClient, TransitSource};
use upstream::weather::WeatherClient;
use upstream::UpstreamResult;
use url::form_urlencoded;

const BERLIN: &str = "8011160";
const LEIPZIG: &str = "8010205";

fn utc(instant: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(instant).unwrap().with_timezone(&Utc)
}

fn app(source: &Arc<FakeTransitSource>, weather: FakeWeatherSource) -> AppData {
    AppData::new(TransitClient::new(source.clone()), WeatherClient::new(Arc::new(weather)))
}

fn sunny() -> FakeWeatherSource {
    FakeWeatherSource::new(forecast(&[
        ("2026-06-17", 24.0, 5.0),
        ("2026-06-18", 26.0, 10.0),
        ("2026-06-20", 28.0, 50.0),
    ]))
}

fn berlin_and_leipzig() -> Arc<FakeTransitSource> {
    Arc::new(
        FakeTransitSource::new()
            .with_location(location(BERLIN, "Berlin Hbf", Products::Trains))
            .with_location(location(LEIPZIG, "Leipzig Hbf", Products::Trains)),
    )
}

fn query_string(pairs: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn params(pairs: &[(&str, &str)]) -> FinderParams {
    FinderParams::from_query(Some(&query_string(pairs)))
}

async fn run(app: &AppData, pairs: &[(&str, &str)]) -> Result<(Value, Option<CacheHint>), ApiError> {
    let output = dispatch(app, params(pairs), utc("2026-06-17T10:00:00Z")).await?;
    Ok((serde_json::to_value(&output.body).unwrap(), output.cache))
}

#[tokio::test]
async fn station_search_filters_deduplicates_and_limits() {
    let mut source = FakeTransitSource::new();
    for index in 0..20 {
        let id = if index == 3 { "s2".to_owned() } else { format!("s{}", index) };
        let products = if index % 4 == 1 { Products::LocalOnly } else { Products::Trains };
        source = source.with_location(location(&id, &format!("Berlin Station {}", index), products));
    }
    let source = Arc::new(source);
    let app = app(&source, sunny());

    let (body, cache) = run(&app, &[("mode", "stations"), ("q", "Be"), ("limit", "5")]).await.unwrap();

    let items = body["items"].as_array().unwrap();
    let ids: Vec<&str> = items.iter().map(|item| item["id"].as_str().unwrap()).collect();
    assert!(ids.len() <= 5);
    assert_eq!(ids, vec!["s0", "s2", "s4", "s6", "s7"]);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
    assert!(ids.iter().all(|id| !["s1", "s5", "s9", "s13", "s17"].contains(id)));
    assert_eq!(body["mode"], "stations");
    assert_eq!(body["query"], "Be");
    assert_eq!(cache, Some(CacheHint::Search));
}

#[tokio::test]
async fn station_search_limit_is_clamped() {
    let mut source = FakeTransitSource::new();
    for index in 0..30 {
        source = source.with_location(location(&format!("s{}", index), "Berlin", Products::Trains));
    }
    let source = Arc::new(source);
    let app = app(&source, sunny());

    let (body, _) = run(&app, &[("mode", "stations"), ("q", "Berlin"), ("limit", "99")]).await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 15);

    let (body, _) = run(&app, &[("mode", "stations"), ("q", "Berlin"), ("limit", "nope")]).await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn short_station_query_is_empty_not_an_error() {
    let source = berlin_and_leipzig();
    let app = app(&source, sunny());

    let (body, cache) = run(&app, &[("mode", "stations"), ("q", " B ")]).await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert!(body.get("query").is_none());
    assert_eq!(cache, None);
    assert_eq!(source.upstream_calls(), 0);
}

#[tokio::test]
async fn last_train_with_identical_stations_is_rejected_without_upstream_calls() {
    let source = berlin_and_leipzig();
    let app = app(&source, sunny());

    let err = run(&app, &[("mode", "last-train"), ("fromId", "A"), ("toId", "A")]).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.message(), Message::IdenticalStations);
    assert_eq!(source.upstream_calls(), 0);

    let err = run(&app, &[("mode", "last-train"), ("fromId", "A")]).await.unwrap_err();
    assert_eq!(err.message(), Message::MissingStations);
    assert_eq!(source.upstream_calls(), 0);
}

#[tokio::test]
async fn last_train_finds_the_final_departure_of_the_day() {
    let source = berlin_and_leipzig();
    source.add_route(BERLIN, LEIPZIG, vec![
        vec![
            journey("2026-06-17T20:15:00+02:00", "2026-06-17T21:30:00+02:00", "ICE 1601"),
            journey("2026-06-17T22:40:00+02:00", "2026-06-17T23:55:00+02:00", "ICE 1609"),
        ],
        vec![
            journey_with("2026-06-17T23:50:00+02:00", "2026-06-18T01:05:00+02:00", 1, None, 0),
            journey("2026-06-18T04:30:00+02:00", "2026-06-18T05:45:00+02:00", "RE 50"),
        ],
    ]);
    let app = app(&source, sunny());

    let (body, cache) = run(&app, &[
        ("mode", "last-train"),
        ("fromId", BERLIN),
        ("toId", LEIPZIG),
        ("departure", "2026-06-17T20:00:00+02:00"),
    ]).await.unwrap();

    assert_eq!(body["mode"], "last-train");
    assert_eq!(body["from"]["name"], "Berlin Hbf");
    assert_eq!(body["to"]["id"], LEIPZIG);
    assert_eq!(body["selectedDepartureIso"], "2026-06-17T18:00:00.000Z");
    assert_eq!(body["bestJourney"]["departure"], "2026-06-17T23:50:00+02:00");
    assert_eq!(body["bestJourney"]["transfers"], 1);
    assert_eq!(body["bestJourney"]["risk"], "low");
    assert_eq!(body["alternatives"].as_array().unwrap().len(), 3);
    // Arrival is after midnight, so the weather is the one of the next day
    assert_eq!(body["destinationWeather"]["tempMax"], 26.0);
    assert_eq!(cache, Some(CacheHint::Departures));
}

#[tokio::test]
async fn last_train_without_departures_is_not_found() {
    let source = berlin_and_leipzig();
    let app = app(&source, sunny());

    let err = run(&app, &[("mode", "last-train"), ("fromId", BERLIN), ("toId", LEIPZIG), ("lang", "de")])
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.message().text(Lang::De), "Keine passende Verbindung bis Tagesende gefunden.");
}

#[tokio::test]
async fn last_train_with_unknown_station_is_a_client_error() {
    let source = berlin_and_leipzig();
    let app = app(&source, sunny());

    let err = run(&app, &[("mode", "last-train"), ("fromId", BERLIN), ("toId", "zzz")]).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.message(), Message::UnresolvableStation);
}

#[tokio::test]
async fn last_train_upstream_failure_is_a_bad_gateway() {
    let source = berlin_and_leipzig();
    source.fail_route(BERLIN, LEIPZIG);
    let app = app(&source, sunny());

    let err = run(&app, &[("mode", "last-train"), ("fromId", BERLIN), ("toId", LEIPZIG)]).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(err.message(), Message::ServiceBusy);
}

#[tokio::test]
async fn weekend_budget_is_clamped_before_scoring() {
    let source = berlin_and_leipzig();
    source.add_route(BERLIN, LEIPZIG, vec![vec![
        journey_with("2026-06-20T08:30:00+02:00", "2026-06-20T10:30:00+02:00", 0, Some(300.0), 0),
    ]]);
    source.add_route(LEIPZIG, BERLIN, vec![vec![
        journey_with("2026-06-21T17:00:00+02:00", "2026-06-21T19:00:00+02:00", 0, Some(300.0), 0),
    ]]);
    let app = app(&source, sunny());

    let (body, cache) = run(&app, &[("mode", "weekend"), ("originId", BERLIN), ("budget", "9999")]).await.unwrap();

    assert_eq!(body["budget"], 500.0);
    assert_eq!(body["maxHours"], 4.5);
    assert_eq!(body["destinationQuery"], "Hbf");
    assert_eq!(body["candidatePool"], 1);
    assert_eq!(body["weekendWindow"]["start"], "2026-06-20");
    assert_eq!(body["weekendWindow"]["end"], "2026-06-21");

    let recommendation = &body["recommendations"][0];
    assert_eq!(recommendation["destination"]["name"], "Leipzig Hbf");
    assert_eq!(recommendation["totalPrice"], 600.0);
    // 100 - (600 - 500) * 0.24 - 50 * 0.18
    assert_eq!(recommendation["fitScore"], 67);
    assert_eq!(recommendation["weather"]["precipMax"], 50.0);
    assert_eq!(cache, Some(CacheHint::Search));
}

#[tokio::test]
async fn weekend_needs_a_resolvable_origin() {
    let source = berlin_and_leipzig();
    let app = app(&source, sunny());

    let err = run(&app, &[("mode", "weekend")]).await.unwrap_err();
    assert_eq!(err.message(), Message::MissingOrigin);
    assert_eq!(source.upstream_calls(), 0);

    let err = run(&app, &[("mode", "weekend"), ("originId", "zzz")]).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.message(), Message::UnresolvableOrigin);
}

#[tokio::test]
async fn weekend_without_survivors_is_unavailable() {
    let source = berlin_and_leipzig();
    let app = app(&source, FakeWeatherSource::failing());

    let err = run(&app, &[("mode", "weekend"), ("originId", BERLIN)]).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(err.message(), Message::NoWeekendOptions);
}

#[tokio::test]
async fn unknown_mode_is_rejected() {
    let source = berlin_and_leipzig();
    let app = app(&source, sunny());

    let err = run(&app, &[("mode", "teleport"), ("lang", "de")]).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.message().text(Lang::De), "Ungültiger Modus.");

    let err = run(&app, &[]).await.unwrap_err();
    assert_eq!(err.message(), Message::InvalidMode);
}

struct PanickingSource;

#[async_trait]
impl TransitSource for PanickingSource {
    async fn locations(&self, _query: &str, _results: usize) -> UpstreamResult<Vec<LocationRecord>> {
        panic!("malformed upstream state")
    }

    async fn journeys(&self, _request: &JourneyRequest) -> UpstreamResult<JourneysRecord> {
        panic!("malformed upstream state")
    }
}

#[tokio::test]
async fn panics_become_a_retry_later_response() {
    let app = AppData::new(
        TransitClient::new(Arc::new(PanickingSource)),
        WeatherClient::new(Arc::new(FakeWeatherSource::failing())),
    );

    let response = endpoint(
        State(Arc::new(app)),
        RawQuery(Some(query_string(&[("mode", "stations"), ("q", "Berlin")]))),
    ).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response.headers().get(axum::http::header::CACHE_CONTROL).is_none());
}

#[tokio::test]
async fn successful_responses_carry_cache_headers() {
    let source = berlin_and_leipzig();
    let app = app(&source, sunny());

    let response = endpoint(
        State(Arc::new(app)),
        RawQuery(Some(query_string(&[("mode", "stations"), ("q", "Leipzig")]))),
    ).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(axum::http::header::CACHE_CONTROL).unwrap(),
        "public, s-maxage=300, stale-while-revalidate=3600",
    );
}

#[tokio::test]
async fn repeated_query_keys_use_the_first_value() {
    let source = berlin_and_leipzig();
    let app = Arc::new(app(&source, sunny()));

    let response = endpoint(
        State(app.clone()),
        RawQuery(Some("mode=stations&q=Leipzig&lang=de&lang=en&q=Berlin".to_owned())),
    ).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["query"], "Leipzig");
    assert_eq!(body["items"][0]["id"], LEIPZIG);

    // Errors after a repeated key are still JSON in the first requested language
    let response = endpoint(State(app), RawQuery(Some("mode=teleport&lang=de&lang=en&mode=stations".to_owned()))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Ungültiger Modus.");
}

#[tokio::test]
async fn missing_query_string_is_an_invalid_mode() {
    let source = berlin_and_leipzig();
    let app = app(&source, sunny());

    let response = endpoint(State(Arc::new(app)), RawQuery(None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Invalid mode.");
}
