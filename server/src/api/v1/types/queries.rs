use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use common::util::time::SERVICE_TIMEZONE;
use url::form_urlencoded;

/// All query parameters of the finder endpoint. Every mode only looks at its own subset, and all
/// of them are parsed leniently: malformed numbers fall back to defaults instead of failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinderParams {
    pub mode: Option<String>,
    pub lang: Option<String>,
    // stations
    pub q: Option<String>,
    pub limit: Option<String>,
    // last-train
    pub from_id: Option<String>,
    pub to_id: Option<String>,
    pub departure: Option<String>,
    // weekend
    pub origin_id: Option<String>,
    pub budget: Option<String>,
    pub max_hours: Option<String>,
    pub destination_query: Option<String>,
    pub destination_limit: Option<String>,
}

impl FinderParams {
    /// Reads a raw query string. A repeated key keeps its first value and unknown keys are ignored,
    /// so no query string is ever rejected.
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut params = Self::default();

        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "mode" => &mut params.mode,
                "lang" => &mut params.lang,
                "q" => &mut params.q,
                "limit" => &mut params.limit,
                "fromId" => &mut params.from_id,
                "toId" => &mut params.to_id,
                "departure" => &mut params.departure,
                "originId" => &mut params.origin_id,
                "budget" => &mut params.budget,
                "maxHours" => &mut params.max_hours,
                "destinationQuery" => &mut params.destination_query,
                "destinationLimit" => &mut params.destination_limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        params
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    Stations,
    LastTrain,
    Weekend,
}

impl Mode {
    pub fn from_param(param: Option<&str>) -> Option<Self> {
        match param? {
            "stations" => Some(Mode::Stations),
            "last-train" => Some(Mode::LastTrain),
            "weekend" => Some(Mode::Weekend),
            _ => None,
        }
    }
}

/// The trimmed value, or an empty string
pub fn trimmed(param: &Option<String>) -> &str {
    param.as_deref().map(str::trim).unwrap_or("")
}

/// The leading integer of the value. Whatever follows it (a fraction, a unit) is ignored.
pub fn parse_int(param: &Option<String>) -> Option<i64> {
    leading_number(trimmed(param), false).parse::<i64>().ok()
}

/// The leading decimal number of the value, e.g. `4.5` for `4.5h`
pub fn parse_float(param: &Option<String>) -> Option<f64> {
    leading_number(trimmed(param), true).parse::<f64>().ok().filter(|value| value.is_finite())
}

fn leading_number(raw: &str, decimal: bool) -> &str {
    let bytes = raw.as_bytes();
    let skip_digits = |mut index: usize| {
        while bytes.get(index).is_some_and(u8::is_ascii_digit) {
            index += 1;
        }
        index
    };

    let mut end = match bytes.first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0,
    };
    end = skip_digits(end);

    if decimal {
        if bytes.get(end) == Some(&b'.') {
            end = skip_digits(end + 1);
        }
        if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
            let mut exponent = end + 1;
            if matches!(bytes.get(exponent), Some(b'+') | Some(b'-')) {
                exponent += 1;
            }
            let exponent_end = skip_digits(exponent);
            if exponent_end > exponent {
                end = exponent_end;
            }
        }
    }

    &raw[..end]
}

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// RFC 3339 instants are taken as is. A date and time without offset (what a browser date-time
/// input submits) is local service time. Anything else means now.
pub fn parse_departure(param: &Option<String>, now: DateTime<Utc>) -> DateTime<Utc> {
    let raw = trimmed(param);
    if raw.is_empty() {
        return now;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return instant.with_timezone(&Utc);
    }

    LOCAL_FORMATS.iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .and_then(|naive| SERVICE_TIMEZONE.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or(now)
}
