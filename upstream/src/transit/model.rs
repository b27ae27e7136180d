//! Records as returned by the journey-planning API and their conversion into our own types.
//!
//! Every field is optional on the wire. Records that lack what we need are dropped during
//! conversion instead of failing the whole response.

use chrono::DateTime;
use common::types::journey::Journey;
use common::types::station::Station;
use common::types::StationId;
use serde::{Deserialize, Serialize};

const FALLBACK_LINE_LABEL: &str = "Train";
const FALLBACK_CURRENCY: &str = "EUR";

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct LocationRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location: Option<CoordinatesRecord>,
    pub products: Option<ProductsRecord>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct CoordinatesRecord {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductsRecord {
    pub national_express: Option<bool>,
    pub national: Option<bool>,
    pub regional_express: Option<bool>,
    pub regional: Option<bool>,
    pub suburban: Option<bool>,
    pub bus: Option<bool>,
    pub ferry: Option<bool>,
    pub subway: Option<bool>,
    pub tram: Option<bool>,
}

impl ProductsRecord {
    /// Whether any train product we care about calls here. Bus, ferry, tram and subway alone do
    /// not count.
    pub fn serves_trains(&self) -> bool {
        [
            self.national,
            self.national_express,
            self.regional,
            self.regional_express,
            self.suburban,
        ]
        .iter()
        .any(|product| product.unwrap_or(false))
    }
}

impl LocationRecord {
    pub fn is_station_or_stop(&self) -> bool {
        matches!(self.kind.as_deref(), Some("station") | Some("stop"))
    }

    pub fn to_station(&self) -> Option<Station> {
        let id = self.id.as_deref().filter(|id| !id.is_empty())?;
        let name = self.name.as_deref().filter(|name| !name.is_empty())?;
        let location = self.location.as_ref()?;
        let latitude = location.latitude.filter(|lat| lat.is_finite())?;
        let longitude = location.longitude.filter(|lon| lon.is_finite())?;

        if !self.products.as_ref().is_some_and(ProductsRecord::serves_trains) {
            return None;
        }

        Some(Station {
            id: StationId::from(id),
            name: name.to_owned(),
            latitude,
            longitude,
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct JourneysRecord {
    #[serde(default)]
    pub journeys: Vec<JourneyRecord>,
    pub later_ref: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct JourneyRecord {
    #[serde(default)]
    pub legs: Vec<LegRecord>,
    #[serde(default)]
    pub remarks: Vec<RemarkRecord>,
    pub price: Option<PriceRecord>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct LegRecord {
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub line: Option<LineRecord>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LineRecord {
    pub name: Option<String>,
    pub product_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct RemarkRecord {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct PriceRecord {
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

impl JourneyRecord {
    /// Condenses the legs into a `Journey`. Journeys without legs, with unparseable times or that
    /// do not arrive strictly after they depart are rejected.
    pub fn to_journey(&self) -> Option<Journey> {
        let first_leg = self.legs.first()?;
        let last_leg = self.legs.last()?;

        let departure = DateTime::parse_from_rfc3339(first_leg.departure.as_deref()?).ok()?;
        let arrival = DateTime::parse_from_rfc3339(last_leg.arrival.as_deref()?).ok()?;
        if arrival <= departure {
            return None;
        }

        let duration_ms = (arrival - departure).num_milliseconds();
        let duration_minutes = (duration_ms as f64 / 60_000.0).round() as i64;

        let line_label = first_leg.line.as_ref()
            .and_then(|line| {
                line.name.as_deref().filter(|name| !name.is_empty())
                    .or(line.product_name.as_deref().filter(|name| !name.is_empty()))
            })
            .unwrap_or(FALLBACK_LINE_LABEL)
            .to_owned();

        let price_amount = self.price.as_ref()
            .and_then(|price| price.amount)
            .filter(|amount| amount.is_finite());
        let currency = self.price.as_ref()
            .and_then(|price| price.currency.as_deref())
            .filter(|currency| !currency.is_empty())
            .unwrap_or(FALLBACK_CURRENCY)
            .to_owned();

        Some(Journey {
            departure,
            arrival,
            duration_minutes,
            transfers: self.legs.len().saturating_sub(1) as u32,
            line_label,
            price_amount,
            currency,
            remark_count: self.remarks.len() as u32,
        })
    }
}
