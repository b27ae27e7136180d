use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt::{Debug, Formatter};

/// One scheduled trip between two stations, condensed from its legs. Timestamps keep the offset the
/// transit API reported them in.
#[derive(Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub departure: DateTime<FixedOffset>,
    pub arrival: DateTime<FixedOffset>,
    pub duration_minutes: i64,
    pub transfers: u32,
    pub line_label: String,
    pub price_amount: Option<f64>,
    pub currency: String,
    pub remark_count: u32,
}

impl Journey {
    pub fn risk(&self) -> RiskLevel {
        RiskLevel::assess(self.transfers, self.remark_count)
    }
}

impl Debug for Journey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{} ---{}---> {} ({} transfers, {} remarks)",
            self.departure, self.line_label, self.arrival, self.transfers, self.remark_count
        ))
    }
}

/// One chronological page of journeys. `later_ref` is the cursor for the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct JourneyPage {
    pub journeys: Vec<Journey>,
    pub later_ref: Option<String>,
}

/// How fragile an itinerary is, judged by the number of transfers plus the number of service
/// remarks (disruptions, notes) attached to it.
#[derive(Serialize, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn assess(transfers: u32, remark_count: u32) -> Self {
        match transfers + remark_count {
            0..=1 => RiskLevel::Low,
            2..=3 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_thresholds() {
        assert_eq!(RiskLevel::assess(0, 0), RiskLevel::Low);
        assert_eq!(RiskLevel::assess(1, 0), RiskLevel::Low);
        assert_eq!(RiskLevel::assess(2, 0), RiskLevel::Medium);
        assert_eq!(RiskLevel::assess(1, 2), RiskLevel::Medium);
        assert_eq!(RiskLevel::assess(3, 1), RiskLevel::High);
        assert_eq!(RiskLevel::assess(0, 4), RiskLevel::High);
    }

    #[test]
    fn journey_serializes_camel_case_with_offsets() {
        let journey = Journey {
            departure: DateTime::parse_from_rfc3339("2026-06-17T22:10:00+02:00").unwrap(),
            arrival: DateTime::parse_from_rfc3339("2026-06-17T23:40:00+02:00").unwrap(),
            duration_minutes: 90,
            transfers: 1,
            line_label: "ICE 1234".into(),
            price_amount: None,
            currency: "EUR".into(),
            remark_count: 2,
        };

        let json = serde_json::to_value(&journey).unwrap();
        assert_eq!(json["departure"], "2026-06-17T22:10:00+02:00");
        assert_eq!(json["durationMinutes"], 90);
        assert_eq!(json["lineLabel"], "ICE 1234");
        assert!(json["priceAmount"].is_null());
        assert_eq!(json["remarkCount"], 2);
        assert_eq!(journey.risk(), RiskLevel::Medium);
        assert_eq!(serde_json::to_value(journey.risk()).unwrap(), "medium");
    }
}
