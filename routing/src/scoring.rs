/// Everything the weekend fit score looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitInput {
    pub budget: f64,
    pub max_hours: f64,
    /// Round-trip fare, if both legs have a known fare
    pub total_price: Option<f64>,
    pub outbound_duration_minutes: i64,
    pub transfers: u32,
    /// Maximum precipitation probability in percent
    pub precipitation: Option<f64>,
}

pub const MIN_SCORE: f64 = 10.0;
pub const MAX_SCORE: f64 = 100.0;

const PRICE_PENALTY_PER_UNIT_OVER_BUDGET: f64 = 0.24;
const UNKNOWN_PRICE_PENALTY: f64 = 12.0;
const DURATION_PENALTY_PER_HOUR_OVER_LIMIT: f64 = 9.0;
const TRANSFER_PENALTY: f64 = 3.0;
const PRECIPITATION_PENALTY_PER_PERCENT: f64 = 0.18;
const MAX_PRECIPITATION_PENALTY: f64 = 16.0;
const UNKNOWN_WEATHER_PENALTY: f64 = 6.0;

/// Weighted-penalty score between 10 and 100. Starts at 100 and subtracts penalties for going over
/// budget, going over the travel time limit, transfers and rain.
pub fn fit_score(input: &FitInput) -> u32 {
    let price_penalty = match input.total_price {
        Some(price) => ((price - input.budget) * PRICE_PENALTY_PER_UNIT_OVER_BUDGET).max(0.0),
        None => UNKNOWN_PRICE_PENALTY,
    };

    let duration_hours = input.outbound_duration_minutes as f64 / 60.0;
    let duration_penalty = ((duration_hours - input.max_hours) * DURATION_PENALTY_PER_HOUR_OVER_LIMIT).max(0.0);

    let transfer_penalty = input.transfers as f64 * TRANSFER_PENALTY;

    let weather_penalty = match input.precipitation {
        Some(precipitation) => (precipitation * PRECIPITATION_PENALTY_PER_PERCENT).clamp(0.0, MAX_PRECIPITATION_PENALTY),
        None => UNKNOWN_WEATHER_PENALTY,
    };

    let score = MAX_SCORE - price_penalty - duration_penalty - transfer_penalty - weather_penalty;
    score.clamp(MIN_SCORE, MAX_SCORE).round() as u32
}
