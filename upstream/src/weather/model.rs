use common::types::weather::WeatherSnapshot;
use serde::{Deserialize, Serialize};

/// Response of the forecast API. The daily series are index-aligned with `time`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ForecastRecord {
    pub daily: Option<DailyRecord>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct DailyRecord {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
}

impl ForecastRecord {
    /// The values for `date` (`YYYY-MM-DD`). Unknown if the date is not part of the series.
    pub fn snapshot_for(&self, date: &str) -> WeatherSnapshot {
        let Some(daily) = &self.daily else {
            return WeatherSnapshot::unknown();
        };
        let Some(index) = daily.time.iter().position(|day| day == date) else {
            return WeatherSnapshot::unknown();
        };

        let value_at = |series: &[Option<f64>]| {
            series.get(index).copied().flatten().filter(|value| value.is_finite())
        };

        WeatherSnapshot {
            temp_max: value_at(&daily.temperature_2m_max),
            precip_max: value_at(&daily.precipitation_probability_max),
        }
    }
}
