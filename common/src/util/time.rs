use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// All calendar reasoning ("same day", "next Saturday") happens in this zone, no matter which
/// offset a timestamp was reported in.
pub const SERVICE_TIMEZONE: Tz = chrono_tz::Europe::Berlin;

/// The local calendar day an instant falls on
pub fn local_day<O: TimeZone>(instant: &DateTime<O>) -> NaiveDate {
    instant.with_timezone(&SERVICE_TIMEZONE).date_naive()
}

/// The instant of a local wall-clock time on the given day. Ambiguous times (the repeated hour when
/// DST ends) resolve to the earlier instant. A time inside the DST gap does not exist locally and is
/// read as UTC instead.
pub fn local_instant(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let naive = day.and_hms_opt(hour, minute, 0).unwrap_or_else(|| day.and_time(Default::default()));

    match SERVICE_TIMEZONE.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

/// `YYYY-MM-DD`, the day format both upstream APIs use
pub fn iso_date(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
