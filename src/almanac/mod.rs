//! Season and sunrise/sunset event finding
//!
//! Answers "when does X happen?" for the events the equilux search needs:
//! season boundaries (equinoxes and solstices) and horizon crossings of the
//! Sun for a ground observer.
//!
//! The classifier functions return closures suitable for use with
//! [`find_discrete`](crate::searchlib::find_discrete); the
//! [`EphemerisProvider`] trait packages the two searches behind one interface
//! so the event source can be swapped out, and [`SolarProvider`] is the
//! production implementation backed by the analytic solar model in
//! [`solarlib`](crate::solarlib).
//!
//! # Example
//!
//! ```ignore
//! let provider = SolarProvider::new();
//! for event in provider.season_events(2025, 2025)? {
//!     println!("{}: {}", event.time, event.kind);
//! }
//! ```

pub mod mock;

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::errors::{EquiluxError, Result};
use crate::searchlib::{find_discrete, SearchOptions};
use crate::solarlib;
use crate::timelib::{Time, Timescale};

/// Sun's apparent angular radius plus standard refraction (50 arcminutes).
/// The Sun is "up" while its geometric center is above this altitude.
pub const SUN_HORIZON_DEGREES: f64 = -50.0 / 60.0;

/// Scan step for season finding, in days
const SEASONS_STEP_DAYS: f64 = 90.0;

/// Scan step for horizon crossings, in days
const SUN_STEP_DAYS: f64 = 0.25;

/// Years the production provider will answer for, matching the span of the
/// JPL DE430t ephemeris this model stands in for.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1550..=2649;

/// The quarter of the astronomical year that begins at a season boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonKind {
    VernalEquinox,
    SummerSolstice,
    AutumnalEquinox,
    WinterSolstice,
}

impl SeasonKind {
    /// Map a season index (0..3, the Sun's ecliptic longitude quadrant) to
    /// its kind. Indices wrap modulo 4.
    pub fn from_index(index: i64) -> Self {
        match index.rem_euclid(4) {
            0 => SeasonKind::VernalEquinox,
            1 => SeasonKind::SummerSolstice,
            2 => SeasonKind::AutumnalEquinox,
            _ => SeasonKind::WinterSolstice,
        }
    }

    /// Conventional event name, as printed by almanacs.
    pub fn name(&self) -> &'static str {
        match self {
            SeasonKind::VernalEquinox => "Vernal Equinox",
            SeasonKind::SummerSolstice => "Summer Solstice",
            SeasonKind::AutumnalEquinox => "Autumnal Equinox",
            SeasonKind::WinterSolstice => "Winter Solstice",
        }
    }
}

impl fmt::Display for SeasonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ground observer: geographic coordinates plus the IANA timezone used to
/// localize event times.
///
/// Coordinates are taken at face value; latitude is degrees north, longitude
/// degrees east.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub timezone: String,
}

impl Location {
    pub fn new(latitude_deg: f64, longitude_deg: f64, timezone: impl Into<String>) -> Self {
        Location {
            latitude_deg,
            longitude_deg,
            timezone: timezone.into(),
        }
    }
}

/// One season boundary: the instant the Sun's apparent ecliptic longitude
/// crosses a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonEvent {
    pub time: Time,
    pub kind: SeasonKind,
}

/// One horizon crossing of the Sun. `rising` is true for sunrise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunEvent {
    pub time: Time,
    pub rising: bool,
}

/// Return a closure that computes the season index (0..3) from the Sun's
/// apparent ecliptic longitude.
///
/// The closure maps TT Julian dates to season indices:
/// - 0 = Sun in 0°..90° (northern spring)
/// - 1 = Sun in 90°..180° (northern summer)
/// - 2 = Sun in 180°..270° (northern autumn)
/// - 3 = Sun in 270°..360° (northern winter)
///
/// Use with [`find_discrete`] with `step_days = 90.0`.
pub fn seasons() -> impl FnMut(&[f64]) -> Vec<i64> {
    |jd_tt: &[f64]| {
        jd_tt
            .iter()
            .map(|&jd| {
                let lon = solarlib::sun_coordinates(jd).ecliptic_longitude;
                (lon / 90.0).floor() as i64 % 4
            })
            .collect()
    }
}

/// Return a closure that computes whether the Sun is above the horizon (1)
/// or below (0) for an observer, using the standard depression angle of
/// -50 arcminutes (solar radius plus refraction).
///
/// Use with [`find_discrete`] with `step_days = 0.25`.
pub fn sunrise_sunset(
    ts: &Timescale,
    latitude_deg: f64,
    longitude_deg: f64,
) -> impl FnMut(&[f64]) -> Vec<i64> + '_ {
    move |jd_tt: &[f64]| {
        jd_tt
            .iter()
            .map(|&jd| {
                let t = ts.tt_jd(jd);
                let alt = solarlib::sun_altitude_degrees(latitude_deg, longitude_deg, &t);
                i64::from(alt >= SUN_HORIZON_DEGREES)
            })
            .collect()
    }
}

/// Source of astronomical events for the equilux search.
///
/// Both methods return events in strictly increasing time order. Production
/// code uses [`SolarProvider`]; tests substitute [`mock::MockProvider`].
pub trait EphemerisProvider {
    /// All season boundaries from January 1 of `year_start` through
    /// December 31 of `year_end`, UTC.
    fn season_events(&self, year_start: i32, year_end: i32) -> Result<Vec<SeasonEvent>>;

    /// All horizon crossings of the Sun for `observer` between `t0` and `t1`.
    fn sun_events(&self, observer: &Location, t0: &Time, t1: &Time) -> Result<Vec<SunEvent>>;
}

/// Production event source computing the Sun analytically.
///
/// Stateless apart from its [`Timescale`], so one instance can be shared
/// across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolarProvider {
    ts: Timescale,
}

impl SolarProvider {
    pub fn new() -> Self {
        SolarProvider {
            ts: Timescale::new(),
        }
    }

    fn check_year(year: i32) -> Result<()> {
        if SUPPORTED_YEARS.contains(&year) {
            Ok(())
        } else {
            Err(EquiluxError::EphemerisRange {
                year,
                min_year: *SUPPORTED_YEARS.start(),
                max_year: *SUPPORTED_YEARS.end(),
            })
        }
    }
}

impl EphemerisProvider for SolarProvider {
    fn season_events(&self, year_start: i32, year_end: i32) -> Result<Vec<SeasonEvent>> {
        Self::check_year(year_start)?;
        Self::check_year(year_end)?;

        let t0 = self.ts.utc(year_start, 1, 1);
        let t1 = self.ts.utc(year_end + 1, 1, 1);
        let events = find_discrete(
            t0.tt(),
            t1.tt(),
            &mut seasons(),
            SearchOptions::with_step(SEASONS_STEP_DAYS),
        )?;

        Ok(events
            .into_iter()
            .map(|(jd, index)| SeasonEvent {
                time: self.ts.tt_jd(jd),
                kind: SeasonKind::from_index(index),
            })
            .collect())
    }

    fn sun_events(&self, observer: &Location, t0: &Time, t1: &Time) -> Result<Vec<SunEvent>> {
        // t1 is an exclusive bound: a scan ending at midnight Jan 1 only
        // needs the year before it, so nudge back before taking the year.
        let (year0, _, _) = t0.utc_calendar();
        let (year1, _, _) = self.ts.ut_jd(t1.ut() - 1e-6).utc_calendar();
        Self::check_year(year0)?;
        Self::check_year(year1)?;

        let mut f = sunrise_sunset(&self.ts, observer.latitude_deg, observer.longitude_deg);
        let events = find_discrete(
            t0.tt(),
            t1.tt(),
            &mut f,
            SearchOptions::with_step(SUN_STEP_DAYS),
        )?;

        Ok(events
            .into_iter()
            .map(|(jd, value)| SunEvent {
                time: self.ts.tt_jd(jd),
                rising: value == 1,
            })
            .collect())
    }
}
