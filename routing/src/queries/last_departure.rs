//! The last departure query asks for the latest journey that still leaves on the same (local)
//! calendar day as the reference instant, and not before it.
//!
//! Journey APIs only return fixed-size pages in chronological order, so the search walks forward
//! page by page until a departure on a later day shows up or the pages run out.

use crate::errors::{QueryError, QueryResult};
use chrono::{DateTime, FixedOffset, Utc};
use common::types::journey::Journey;
use common::types::station::Station;
use common::util::time::local_day;
use hashbrown::HashSet;
use itertools::Itertools;
use log::{debug, info};
use upstream::transit::{JourneyRequest, TransitClient};

/// Upper bound on page fetches, including the first one
pub const MAX_PAGES: usize = 14;
pub const RESULTS_PER_PAGE: usize = 8;
/// Number of journeys at the end of the day that are reported, the best one included
pub const ALTERNATIVES: usize = 4;

#[derive(Debug, Clone)]
pub struct LastDepartureOutput {
    pub best: Journey,
    /// The final journeys of the day in departure order. The last entry is `best`.
    pub alternatives: Vec<Journey>,
}

type JourneyKey = (DateTime<FixedOffset>, DateTime<FixedOffset>, String);

pub async fn find_last_departure(
    transit: &TransitClient,
    from: &Station,
    to: &Station,
    reference: DateTime<Utc>,
) -> QueryResult<LastDepartureOutput> {
    let target_day = local_day(&reference);

    let mut seen: HashSet<JourneyKey> = HashSet::new();
    let mut same_day: Vec<Journey> = Vec::new();
    let mut request = JourneyRequest::departing(&from.id, &to.id, reference, RESULTS_PER_PAGE);

    for page_number in 1..=MAX_PAGES {
        // Pages have to be fetched one after another, each cursor comes with the previous page
        let page = transit.fetch_journey_page(&request).await?;
        let mut crossed_day_boundary = false;

        for journey in page.journeys {
            let departure_day = local_day(&journey.departure);
            if departure_day != target_day {
                if departure_day > target_day {
                    crossed_day_boundary = true;
                }
                continue;
            }
            if journey.departure < reference {
                continue;
            }

            let key = (journey.departure, journey.arrival, journey.line_label.clone());
            if seen.insert(key) {
                same_day.push(journey);
            }
        }

        match page.later_ref {
            Some(later_ref) if !crossed_day_boundary => {
                if page_number == MAX_PAGES {
                    info!(target: "last-departure", "Stopped after {} pages from {} to {} without reaching the next day", MAX_PAGES, from.id, to.id);
                    break;
                }
                request = request.later_than(later_ref);
            }
            _ => {
                debug!(target: "last-departure", "Finished after {} pages from {} to {}", page_number, from.id, to.id);
                break;
            }
        }
    }

    let same_day = same_day.into_iter()
        .sorted_by_key(|journey| journey.departure)
        .collect_vec();

    let best = same_day.last().cloned().ok_or(QueryError::NoDepartureFound)?;
    let alternatives = same_day[same_day.len().saturating_sub(ALTERNATIVES)..].to_vec();

    Ok(LastDepartureOutput { best, alternatives })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{station, utc};
    use std::sync::Arc;
    use upstream::fake::{journey, FakeTransitSource};

    fn setup() -> (Arc<FakeTransitSource>, TransitClient) {
        let source = Arc::new(FakeTransitSource::new());
        let client = TransitClient::new(source.clone());
        (source, client)
    }

    #[tokio::test]
    async fn stops_at_midnight_in_local_time() {
        let (source, transit) = setup();
        source.add_route("A", "B", vec![
            vec![
                journey("2026-06-17T20:15:00+02:00", "2026-06-17T21:30:00+02:00", "RE 1"),
                journey("2026-06-17T21:40:00+02:00", "2026-06-17T22:55:00+02:00", "RE 1"),
            ],
            vec![
                journey("2026-06-17T23:05:00+02:00", "2026-06-18T00:20:00+02:00", "RE 1"),
                journey("2026-06-17T23:50:00+02:00", "2026-06-18T01:05:00+02:00", "RB 23"),
                // Still June 17th in UTC, but already the next day locally
                journey("2026-06-18T01:30:00+02:00", "2026-06-18T02:45:00+02:00", "RE 1"),
            ],
            vec![
                journey("2026-06-18T05:10:00+02:00", "2026-06-18T06:25:00+02:00", "RE 1"),
            ],
        ]);

        let output = find_last_departure(&transit, &station("A"), &station("B"), utc("2026-06-17T18:00:00Z"))
            .await
            .unwrap();

        assert_eq!(output.best.departure.to_rfc3339(), "2026-06-17T23:50:00+02:00");
        assert_eq!(output.best.line_label, "RB 23");
        assert_eq!(output.alternatives.len(), 4);
        assert_eq!(output.alternatives.first().unwrap().departure.to_rfc3339(), "2026-06-17T20:15:00+02:00");
        assert_eq!(output.alternatives.last(), Some(&output.best));
        // The third page is never needed
        assert_eq!(source.journey_calls(), 2);
    }

    #[tokio::test]
    async fn skips_earlier_departures_and_duplicates() {
        let (source, transit) = setup();
        source.add_route("A", "B", vec![
            vec![
                journey("2026-06-17T19:55:00+02:00", "2026-06-17T21:00:00+02:00", "ICE 7"),
                journey("2026-06-17T22:10:00+02:00", "2026-06-17T23:20:00+02:00", "ICE 9"),
            ],
            vec![
                journey("2026-06-17T22:10:00+02:00", "2026-06-17T23:20:00+02:00", "ICE 9"),
                journey("2026-06-17T21:10:00+02:00", "2026-06-17T22:20:00+02:00", "ICE 8"),
            ],
        ]);

        let output = find_last_departure(&transit, &station("A"), &station("B"), utc("2026-06-17T18:00:00Z"))
            .await
            .unwrap();

        let lines: Vec<&str> = output.alternatives.iter().map(|journey| journey.line_label.as_str()).collect();
        assert_eq!(lines, vec!["ICE 8", "ICE 9"]);
        assert_eq!(output.best.line_label, "ICE 9");
    }

    #[tokio::test]
    async fn page_count_is_capped() {
        let (source, transit) = setup();
        source.add_endless_route("A", "B", vec![
            journey("2026-06-17T21:00:00+02:00", "2026-06-17T22:00:00+02:00", "S 1"),
        ]);

        let output = find_last_departure(&transit, &station("A"), &station("B"), utc("2026-06-17T18:00:00Z"))
            .await
            .unwrap();

        assert_eq!(source.journey_calls(), MAX_PAGES);
        assert_eq!(output.alternatives.len(), 1);
    }

    #[tokio::test]
    async fn nothing_left_today_is_not_found() {
        let (source, transit) = setup();
        source.add_route("A", "B", vec![vec![
            journey("2026-06-18T05:10:00+02:00", "2026-06-18T06:25:00+02:00", "RE 1"),
        ]]);

        let result = find_last_departure(&transit, &station("A"), &station("B"), utc("2026-06-17T21:45:00Z")).await;
        assert!(matches!(result, Err(QueryError::NoDepartureFound)));
    }

    #[tokio::test]
    async fn upstream_failures_abort_the_search() {
        let (source, transit) = setup();
        source.fail_route("A", "B");

        let result = find_last_departure(&transit, &station("A"), &station("B"), utc("2026-06-17T18:00:00Z")).await;
        assert!(matches!(result, Err(QueryError::Upstream(_))));
    }
}
