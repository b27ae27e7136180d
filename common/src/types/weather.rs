use serde::Serialize;

// Forecast values for one location and one calendar day. Both values are missing when the day lies
// outside the forecast horizon or the forecast could not be fetched at all.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Maximum temperature in °C
    pub temp_max: Option<f64>,
    /// Maximum precipitation probability in percent
    pub precip_max: Option<f64>,
}

impl WeatherSnapshot {
    pub fn unknown() -> Self {
        Self::default()
    }
}
