use common::types::journey::{Journey, RiskLevel};
use common::types::station::{Station, StationSummary};
use common::types::weather::WeatherSnapshot;
use routing::queries::weekend::{WeekendRecommendation, WeekendWindow};
use serde::Serialize;

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum FinderBody {
    Stations(StationsResponse),
    LastTrain(LastTrainResponse),
    Weekend(WeekendResponse),
}

#[derive(Serialize, Debug)]
pub struct StationsResponse {
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub items: Vec<Station>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LastTrainResponse {
    pub mode: &'static str,
    pub from: StationSummary,
    pub to: StationSummary,
    pub selected_departure_iso: String,
    pub best_journey: RatedJourney,
    pub alternatives: Vec<Journey>,
    pub destination_weather: WeatherSnapshot,
}

#[derive(Serialize, Debug)]
pub struct RatedJourney {
    #[serde(flatten)]
    pub journey: Journey,
    pub risk: RiskLevel,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WeekendResponse {
    pub mode: &'static str,
    pub origin: StationSummary,
    pub weekend_window: WeekendWindow,
    pub budget: f64,
    pub max_hours: f64,
    pub destination_query: String,
    pub candidate_pool: usize,
    pub recommendations: Vec<WeekendRecommendation>,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: &'static str,
}
