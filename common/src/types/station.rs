use crate::types::StationId;
use serde::Serialize;

/// A station or stop that long-distance and regional trains call at. Pure bus, tram and subway
/// stops never become a `Station`; the transit client filters them out while parsing.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Station {
    pub fn summary(&self) -> StationSummary {
        StationSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// The part of a station that is echoed back in query responses
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StationSummary {
    pub id: StationId,
    pub name: String,
}
