//! Time scales, Julian dates, and calendar conversion
//!
//! Provides the [`Timescale`] factory and the [`Time`] instant used throughout
//! the crate. A `Time` carries both its Terrestrial Time (TT) and Universal
//! Time Julian dates, related through the delta-T model in [`delta_t`]. UTC
//! is treated as UT1 here; the two never differ by more than 0.9 s, well
//! under the one-second resolution of the events this crate works with.
//!
//! Calendar arithmetic follows the Explanatory Supplement to the Astronomical
//! Almanac 15.11, proleptic Gregorian only.

pub mod delta_t;

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::constants::{DAY_S, UNIX_EPOCH_JD};
use crate::errors::{EquiluxError, Result};

/// Factory for [`Time`] instants.
///
/// Owns no state today; it exists so that every `Time` is built through one
/// place where the delta-T model is applied, and so a future leap-second or
/// IERS table has an obvious home.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timescale;

impl Timescale {
    pub fn new() -> Self {
        Timescale
    }

    /// Build a `Time` for midnight UTC on a calendar date.
    ///
    /// The day number may fall outside the month (0, -3, 40, ...); it is
    /// normalized arithmetically, so `utc(2025, 9, 32)` is October 2.
    pub fn utc(&self, year: i32, month: i32, day: i32) -> Time {
        self.utc_time(year, month, day, 0, 0, 0.0)
    }

    /// Build a `Time` for a UTC calendar date and time of day.
    pub fn utc_time(
        &self,
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: f64,
    ) -> Time {
        let day_fraction =
            (hour as f64 * 3600.0 + minute as f64 * 60.0 + second) / DAY_S;
        let jd_ut = compute_julian_date(year, month, day as f64 + day_fraction);
        self.ut_jd(jd_ut)
    }

    /// Build a `Time` from a Universal Time Julian date.
    pub fn ut_jd(&self, jd_ut: f64) -> Time {
        let dt = delta_t::delta_t_seconds(julian_year(jd_ut));
        Time {
            tt: jd_ut + dt / DAY_S,
            ut: jd_ut,
        }
    }

    /// Build a `Time` from a Terrestrial Time Julian date.
    pub fn tt_jd(&self, jd_tt: f64) -> Time {
        let dt = delta_t::delta_t_seconds(julian_year(jd_tt));
        Time {
            tt: jd_tt,
            ut: jd_tt - dt / DAY_S,
        }
    }

    /// Build a `Time` from a chrono UTC datetime.
    pub fn from_utc_datetime(&self, dt: &DateTime<Utc>) -> Time {
        let unix = dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 * 1e-9;
        self.ut_jd(UNIX_EPOCH_JD + unix / DAY_S)
    }
}

/// An instant, carrying its Terrestrial Time and Universal Time Julian dates.
///
/// Both scales are fixed when the instant is built by a [`Timescale`], so
/// conversions round-trip exactly.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Time {
    tt: f64,
    ut: f64,
}

impl Time {
    /// Terrestrial Time Julian date.
    pub fn tt(&self) -> f64 {
        self.tt
    }

    /// Universal Time Julian date (UT1; UTC within 0.9 s).
    pub fn ut(&self) -> f64 {
        self.ut
    }

    /// The UTC calendar date (year, month, day) containing this instant.
    pub fn utc_calendar(&self) -> (i32, i32, i32) {
        compute_calendar_date((self.ut + 0.5).floor() as i64)
    }

    /// Convert to a chrono UTC datetime.
    ///
    /// # Panics
    /// Panics if the instant lies outside chrono's representable range
    /// (roughly +/-262,000 years).
    pub fn to_utc_datetime(&self) -> DateTime<Utc> {
        let unix = (self.ut() - UNIX_EPOCH_JD) * DAY_S;
        let secs = unix.floor();
        let mut nanos = ((unix - secs) * 1e9).round() as u32;
        let mut secs = secs as i64;
        if nanos >= 1_000_000_000 {
            nanos -= 1_000_000_000;
            secs += 1;
        }
        DateTime::from_timestamp(secs, nanos).expect("Julian date outside chrono's range")
    }

    /// Convert to a zoned datetime in an IANA timezone.
    pub fn in_zone(&self, tz: &Tz) -> DateTime<Tz> {
        self.to_utc_datetime().with_timezone(tz)
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_utc_datetime().format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| EquiluxError::UnknownTimezone(name.to_string()))
}

/// Approximate decimal year of a Julian date, for delta-T evaluation.
fn julian_year(jd: f64) -> f64 {
    (jd - 1_721_045.0) / 365.25
}

/// Convert (year, month, day) to a Julian date float.
///
/// The fractional part of `day` carries the time of day; midnight lands on
/// a half-integer Julian date.
pub fn compute_julian_date(year: i32, month: i32, day: f64) -> f64 {
    let day_int = day.floor() as i64;
    let jd_noon = compute_julian_day(year, month, day_int);
    (jd_noon as f64 - 0.5) + (day - day_int as f64)
}

/// Convert (year, month, day) to a Julian day integer (proleptic Gregorian).
///
/// The day term is linear, so out-of-range days extrapolate into adjacent
/// months; the month must be 1..=12.
pub fn compute_julian_day(year: i32, month: i32, day: i64) -> i64 {
    let year = year as i64;
    let month = month as i64;
    let janfeb = month < 3;
    1461 * (year + 4800 - if janfeb { 1 } else { 0 }) / 4
        + 367 * (month - 2 + if janfeb { 12 } else { 0 }) / 12
        - 3 * ((year + 4900 - if janfeb { 1 } else { 0 }) / 100) / 4
        - 32075
        + day
}

/// Convert a Julian day integer to a proleptic Gregorian calendar date.
///
/// See the Explanatory Supplement to the Astronomical Almanac 15.11.
pub fn compute_calendar_date(jd_integer: i64) -> (i32, i32, i32) {
    let f = jd_integer + 1401 + (4 * jd_integer + 274_277) / 146_097 * 3 / 4 - 38;
    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;
    let day = (h % 153) / 5 + 1;
    let month = (h / 153 + 2) % 12 + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;
    (year as i32, month as i32, day as i32)
}

/// Time of day of a zoned datetime in decimal hours.
///
/// This is local wall-clock time: `hour + minute/60 + second/3600`, with
/// sub-second precision carried through.
pub fn decimal_hours<Z: TimeZone>(dt: &DateTime<Z>) -> f64 {
    dt.hour() as f64
        + dt.minute() as f64 / 60.0
        + dt.second() as f64 / 3600.0
        + dt.nanosecond() as f64 / 3.6e12
}

/// The local weekday of a zoned datetime, as its three-letter abbreviation.
pub fn weekday_abbrev<Z: TimeZone>(dt: &DateTime<Z>) -> &'static str {
    match dt.weekday() {
        chrono::Weekday::Mon => "Mon",
        chrono::Weekday::Tue => "Tue",
        chrono::Weekday::Wed => "Wed",
        chrono::Weekday::Thu => "Thu",
        chrono::Weekday::Fri => "Fri",
        chrono::Weekday::Sat => "Sat",
        chrono::Weekday::Sun => "Sun",
    }
}
