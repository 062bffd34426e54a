//! Earliest and latest sunrise and sunset
//!
//! Scans one year's sunrise/sunset stream for a location and reports which
//! events fall earliest and latest by local wall-clock time. These are not
//! solstice-day events for most observers: the equation of time and DST
//! shifts push them days or months away.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::almanac::{EphemerisProvider, Location};
use crate::errors::{EquiluxError, Result};
use crate::timelib::{decimal_hours, parse_timezone, Timescale};

/// The year's boundary sun events, by local clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunExtremes {
    pub earliest_sunrise: DateTime<FixedOffset>,
    pub latest_sunrise: DateTime<FixedOffset>,
    pub earliest_sunset: DateTime<FixedOffset>,
    pub latest_sunset: DateTime<FixedOffset>,
}

/// Running min/max of local time-of-day over one kind of event.
///
/// Strict comparisons keep the chronologically first event on ties.
struct ClockExtremes {
    earliest: Option<(f64, DateTime<FixedOffset>)>,
    latest: Option<(f64, DateTime<FixedOffset>)>,
}

impl ClockExtremes {
    fn new() -> Self {
        ClockExtremes {
            earliest: None,
            latest: None,
        }
    }

    fn update(&mut self, local: DateTime<Tz>) {
        let clock = decimal_hours(&local);
        let fixed = local.fixed_offset();

        match self.earliest {
            Some((best, _)) if clock >= best => {}
            _ => self.earliest = Some((clock, fixed)),
        }
        match self.latest {
            Some((best, _)) if clock <= best => {}
            _ => self.latest = Some((clock, fixed)),
        }
    }
}

/// Find the year's earliest and latest sunrise and sunset by local clock
/// time at `location`.
///
/// Ties resolve to the chronologically first event. A year with no complete
/// set of events fails with [`EquiluxError::NoEquiluxFound`] carrying the
/// year's bounds; no widening is attempted.
pub fn sun_extremes<P: EphemerisProvider>(
    provider: &P,
    location: &Location,
    year: i32,
) -> Result<SunExtremes> {
    let ts = Timescale::new();
    let tz = parse_timezone(&location.timezone)?;
    let t0 = ts.utc(year, 1, 1);
    let t1 = ts.utc(year + 1, 1, 1);

    let events = provider.sun_events(location, &t0, &t1)?;
    debug!("{} sun events over {year}", events.len());

    let mut rises = ClockExtremes::new();
    let mut sets = ClockExtremes::new();
    for event in &events {
        let local = event.time.in_zone(&tz);
        if event.rising {
            rises.update(local);
        } else {
            sets.update(local);
        }
    }

    match (rises.earliest, rises.latest, sets.earliest, sets.latest) {
        (
            Some((_, earliest_sunrise)),
            Some((_, latest_sunrise)),
            Some((_, earliest_sunset)),
            Some((_, latest_sunset)),
        ) => Ok(SunExtremes {
            earliest_sunrise,
            latest_sunrise,
            earliest_sunset,
            latest_sunset,
        }),
        _ => Err(EquiluxError::NoEquiluxFound {
            start_jd: t0.ut(),
            end_jd: t1.ut(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    use crate::almanac::mock::MockProvider;
    use crate::almanac::{SolarProvider, SunEvent};
    use crate::timelib::Timescale;

    fn utc_location() -> Location {
        Location::new(51.48, 0.0, "UTC")
    }

    fn event(ts: &Timescale, day: i32, hour: i32, minute: i32, rising: bool) -> SunEvent {
        SunEvent {
            time: ts.utc_time(2025, 6, day, hour, minute, 0.0),
            rising,
        }
    }

    #[test]
    fn test_extremes_over_canned_stream() {
        let ts = Timescale::new();
        let provider = MockProvider::new().with_sun_events(vec![
            event(&ts, 1, 6, 10, true),
            event(&ts, 1, 18, 0, false),
            event(&ts, 2, 6, 5, true),
            event(&ts, 2, 18, 30, false),
            event(&ts, 3, 6, 20, true),
            event(&ts, 3, 17, 50, false),
        ]);

        let extremes = sun_extremes(&provider, &utc_location(), 2025).unwrap();

        assert_eq!(extremes.earliest_sunrise.day(), 2);
        assert_eq!(extremes.latest_sunrise.day(), 3);
        assert_eq!(extremes.earliest_sunset.day(), 3);
        assert_eq!(extremes.latest_sunset.day(), 2);
    }

    #[test]
    fn test_ties_keep_first_event() {
        let ts = Timescale::new();
        // Identical clock times on consecutive days
        let provider = MockProvider::new().with_sun_events(vec![
            event(&ts, 1, 6, 0, true),
            event(&ts, 1, 18, 0, false),
            event(&ts, 2, 6, 0, true),
            event(&ts, 2, 18, 0, false),
        ]);

        let extremes = sun_extremes(&provider, &utc_location(), 2025).unwrap();

        assert_eq!(extremes.earliest_sunrise.day(), 1);
        assert_eq!(extremes.latest_sunrise.day(), 1);
        assert_eq!(extremes.earliest_sunset.day(), 1);
        assert_eq!(extremes.latest_sunset.day(), 1);
    }

    #[test]
    fn test_empty_stream_fails() {
        let provider = MockProvider::new();

        let err = sun_extremes(&provider, &utc_location(), 2025).unwrap_err();
        assert!(matches!(err, EquiluxError::NoEquiluxFound { .. }));
    }

    #[test]
    fn test_rises_without_sets_fail() {
        let ts = Timescale::new();
        let provider = MockProvider::new()
            .with_sun_events(vec![event(&ts, 1, 6, 0, true), event(&ts, 2, 6, 5, true)]);

        let err = sun_extremes(&provider, &utc_location(), 2025).unwrap_err();
        assert!(matches!(err, EquiluxError::NoEquiluxFound { .. }));
    }

    #[test]
    fn test_new_york_2025_extremes() {
        let provider = SolarProvider::new();
        let location = Location::new(40.7128, -74.0060, "America/New_York");

        let extremes = sun_extremes(&provider, &location, 2025).unwrap();

        // Around the June solstice daylight is longest; DST pushes the
        // latest local sunrise to the eve of the November clock change
        assert_eq!(extremes.earliest_sunrise.month(), 6);
        assert_eq!(extremes.earliest_sunrise.hour(), 5);
        assert_eq!(extremes.latest_sunset.month(), 6);
        assert_eq!(extremes.latest_sunset.hour(), 20);
        assert_eq!(extremes.latest_sunrise.month(), 11);
        assert_eq!(extremes.earliest_sunset.month(), 12);
    }
}
