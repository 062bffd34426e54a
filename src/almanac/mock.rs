//! Canned ephemeris data for tests
//!
//! [`MockProvider`] implements [`EphemerisProvider`] over fixed event
//! sequences, so search and formatting logic can be exercised without the
//! solar model.

use crate::almanac::{EphemerisProvider, Location, SeasonEvent, SunEvent};
use crate::errors::Result;
use crate::timelib::Time;

/// Provider returning pre-recorded event sequences.
///
/// Events outside the queried span are filtered out, matching how a real
/// provider scopes its answers to the request window.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    seasons: Vec<SeasonEvent>,
    sun: Vec<SunEvent>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seasons(mut self, seasons: Vec<SeasonEvent>) -> Self {
        self.seasons = seasons;
        self
    }

    pub fn with_sun_events(mut self, sun: Vec<SunEvent>) -> Self {
        self.sun = sun;
        self
    }
}

impl EphemerisProvider for MockProvider {
    fn season_events(&self, year_start: i32, year_end: i32) -> Result<Vec<SeasonEvent>> {
        Ok(self
            .seasons
            .iter()
            .copied()
            .filter(|e| {
                let (year, _, _) = e.time.utc_calendar();
                (year_start..=year_end).contains(&year)
            })
            .collect())
    }

    fn sun_events(&self, _observer: &Location, t0: &Time, t1: &Time) -> Result<Vec<SunEvent>> {
        Ok(self
            .sun
            .iter()
            .copied()
            .filter(|e| e.time >= *t0 && e.time <= *t1)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::almanac::SeasonKind;
    use crate::timelib::Timescale;

    #[test]
    fn test_mock_filters_seasons_by_year() {
        let ts = Timescale::new();
        let provider = MockProvider::new().with_seasons(vec![
            SeasonEvent {
                time: ts.utc(2024, 9, 22),
                kind: SeasonKind::AutumnalEquinox,
            },
            SeasonEvent {
                time: ts.utc(2025, 9, 22),
                kind: SeasonKind::AutumnalEquinox,
            },
        ]);

        let events = provider.season_events(2025, 2025).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time.utc_calendar(), (2025, 9, 22));
    }

    #[test]
    fn test_mock_filters_sun_events_by_window() {
        let ts = Timescale::new();
        let location = Location::new(0.0, 0.0, "UTC");
        let provider = MockProvider::new().with_sun_events(vec![
            SunEvent {
                time: ts.utc_time(2025, 9, 20, 6, 0, 0.0),
                rising: true,
            },
            SunEvent {
                time: ts.utc_time(2025, 9, 20, 18, 0, 0.0),
                rising: false,
            },
            SunEvent {
                time: ts.utc_time(2025, 9, 21, 6, 0, 0.0),
                rising: true,
            },
        ]);

        let t0 = ts.utc(2025, 9, 20);
        let t1 = ts.utc(2025, 9, 21);
        let events = provider.sun_events(&location, &t0, &t1).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].rising);
        assert!(!events[1].rising);
    }

    #[test]
    fn test_mock_empty_by_default() {
        let ts = Timescale::new();
        let location = Location::new(0.0, 0.0, "UTC");
        let provider = MockProvider::new();

        assert!(provider.season_events(2025, 2025).unwrap().is_empty());
        let t0 = ts.utc(2025, 1, 1);
        let t1 = ts.utc(2026, 1, 1);
        assert!(provider.sun_events(&location, &t0, &t1).unwrap().is_empty());
    }
}
