//! Equilux search
//!
//! The equilux is the calendar day nearest an equinox on which the time from
//! sunrise to sunset is closest to exactly 12 hours. Refraction and the
//! Sun's angular size make daylight slightly longer than geometry alone
//! would give, so the equilux falls a few days after the September equinox
//! and a few days before the March one rather than on the equinox itself.
//!
//! [`EquiluxCalculator`] drives the search against any
//! [`EphemerisProvider`]: locate the year's equinoxes, build the asymmetric
//! search window around the equinox's UTC calendar day, pair the window's
//! sunrise/sunset events into daylight intervals by local clock time, and
//! select the interval closest to 12 hours.


use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::almanac::{EphemerisProvider, Location, SeasonEvent, SeasonKind, SunEvent};
use crate::errors::{EquiluxError, Result};
use crate::timelib::{decimal_hours, parse_timezone, Time, Timescale};

/// The two equinoxes an equilux search can be anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Equinox {
    Vernal,
    Autumnal,
}

impl Equinox {
    /// The season boundary this label selects.
    pub fn season_kind(&self) -> SeasonKind {
        match self {
            Equinox::Vernal => SeasonKind::VernalEquinox,
            Equinox::Autumnal => SeasonKind::AutumnalEquinox,
        }
    }
}

impl fmt::Display for Equinox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Equinox::Vernal => "Vernal",
            Equinox::Autumnal => "Autumnal",
        })
    }
}

/// One day's sunrise-to-sunset interval in the observer's timezone.
///
/// `daylight_hours` is the difference of the two local times of day in
/// decimal hours, the measure the selection step minimizes against 12.0.
#[derive(Debug, Clone, PartialEq)]
pub struct DayInterval {
    pub sunrise: DateTime<Tz>,
    pub sunset: DateTime<Tz>,
    pub daylight_hours: f64,
}

/// A daylight duration decomposed for display.
///
/// Hours and minutes truncate; only the seconds remainder is rounded, and
/// only when displayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaylightTime {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: f64,
}

impl DaylightTime {
    pub fn from_hours(daylight_hours: f64) -> Self {
        let hours = daylight_hours as u32;
        let rem = (daylight_hours - hours as f64) * 60.0;
        let minutes = rem as u32;
        let seconds = (rem - minutes as f64) * 60.0;
        DaylightTime {
            hours,
            minutes,
            seconds,
        }
    }
}

impl fmt::Display for DaylightTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hrs {} min {:.0} sec",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// Signed offset of a day's daylight from exactly 12 hours, in seconds.
/// Negative when the day falls shy of 12 hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    pub seconds: f64,
}

impl Deviation {
    pub fn from_hours(daylight_hours: f64) -> Self {
        Deviation {
            seconds: (daylight_hours - 12.0) * 3600.0,
        }
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds < 0.0 {
            write!(f, "{:.1} seconds shy of 12 hours", -self.seconds)
        } else {
            write!(f, "{:.1} seconds more than 12 hours", self.seconds)
        }
    }
}

/// The outcome of one equilux search.
///
/// All instants carry the observer's local offset; `date` is the local
/// calendar date of the chosen day's sunset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquiluxResult {
    /// The anchoring equinox instant, localized
    pub equinox: DateTime<FixedOffset>,
    /// Local calendar date of the equilux
    pub date: NaiveDate,
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
    /// Daylight duration decomposed for display
    pub daylight: DaylightTime,
    /// Signed offset from exactly 12 hours
    pub deviation: Deviation,
    /// Daylight duration in decimal hours
    pub daylight_hours: f64,
}

/// All season boundaries falling in `year`, in chronological order.
pub fn season_events_for_year<P: EphemerisProvider>(
    provider: &P,
    year: i32,
) -> Result<Vec<SeasonEvent>> {
    provider.season_events(year, year)
}

/// The search window around an equinox, as a pair of UTC midnights.
///
/// The window is deliberately not centered: the equilux falls after the
/// September equinox and before the March one, so the window leans the
/// matching way.
///
/// - Autumnal: [equinox day − 1, equinox day + 7]
/// - Vernal: [equinox day − 7, equinox day + 1]
///
/// The day is the equinox's UTC calendar day; solstices are not valid
/// anchors and fail with [`EquiluxError::UnsupportedEquinoxType`].
pub fn search_window(ts: &Timescale, kind: SeasonKind, equinox: &Time) -> Result<(Time, Time)> {
    let (start_days, end_days) = match kind {
        SeasonKind::AutumnalEquinox => (-1, 7),
        SeasonKind::VernalEquinox => (-7, 1),
        other => return Err(EquiluxError::UnsupportedEquinoxType(other)),
    };

    let (year, month, day) = equinox.utc_calendar();
    Ok((
        ts.utc(year, month, day + start_days),
        ts.utc(year, month, day + end_days),
    ))
}

/// Pair a chronological sunrise/sunset stream into daylight intervals,
/// localized to `tz`.
///
/// A set with no pending rise is ignored (the window can open mid-day), and
/// a trailing rise with no set is dropped; intervals never pair across the
/// window boundary.
pub fn day_intervals(events: &[SunEvent], tz: &Tz) -> Vec<DayInterval> {
    let mut intervals = Vec::new();
    let mut pending_rise: Option<DateTime<Tz>> = None;

    for event in events {
        let local = event.time.in_zone(tz);
        if event.rising {
            pending_rise = Some(local);
        } else if let Some(sunrise) = pending_rise.take() {
            let daylight_hours = decimal_hours(&local) - decimal_hours(&sunrise);
            intervals.push(DayInterval {
                sunrise,
                sunset: local,
                daylight_hours,
            });
        }
    }

    intervals
}

/// The interval whose daylight is closest to exactly 12 hours.
///
/// Ties go to the chronologically first interval; the scan never reorders.
fn closest_to_twelve(intervals: &[DayInterval]) -> Option<&DayInterval> {
    let mut best: Option<(&DayInterval, f64)> = None;

    for interval in intervals {
        let delta = (interval.daylight_hours - 12.0).abs();
        let improves = match best {
            Some((_, best_delta)) => delta < best_delta,
            None => true,
        };
        if improves {
            best = Some((interval, delta));
        }
    }

    best.map(|(interval, _)| interval)
}

/// Assemble the externally visible result from the localized equinox instant
/// and the chosen daylight interval.
pub fn format_result(equinox_local: DateTime<Tz>, interval: &DayInterval) -> EquiluxResult {
    EquiluxResult {
        equinox: equinox_local.fixed_offset(),
        date: interval.sunset.date_naive(),
        sunrise: interval.sunrise.fixed_offset(),
        sunset: interval.sunset.fixed_offset(),
        daylight: DaylightTime::from_hours(interval.daylight_hours),
        deviation: Deviation::from_hours(interval.daylight_hours),
        daylight_hours: interval.daylight_hours,
    }
}

/// Equilux searches against one event source.
///
/// Owns the provider; all methods take `&self`, so one calculator can serve
/// many threads when the provider is `Sync`.
#[derive(Debug, Clone)]
pub struct EquiluxCalculator<P> {
    provider: P,
    ts: Timescale,
}

impl<P: EphemerisProvider> EquiluxCalculator<P> {
    pub fn new(provider: P) -> Self {
        EquiluxCalculator {
            provider,
            ts: Timescale::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Compute the equilux for each requested equinox of `year` at
    /// `location`.
    ///
    /// Results come back keyed by equinox, only for the requested labels.
    /// A year with no sun events in a window (polar latitudes) fails with
    /// [`EquiluxError::NoEquiluxFound`]; nothing is retried or widened.
    pub fn compute(
        &self,
        location: &Location,
        year: i32,
        labels: &[Equinox],
    ) -> Result<BTreeMap<Equinox, EquiluxResult>> {
        let tz = parse_timezone(&location.timezone)?;
        let season_events = season_events_for_year(&self.provider, year)?;

        let mut results = BTreeMap::new();
        for &label in labels {
            let kind = label.season_kind();
            let event = season_events
                .iter()
                .find(|e| e.kind == kind)
                .copied()
                .ok_or_else(|| EquiluxError::NoEquiluxFound {
                    start_jd: self.ts.utc(year, 1, 1).ut(),
                    end_jd: self.ts.utc(year + 1, 1, 1).ut(),
                })?;
            results.insert(label, self.equilux_for_event(location, &tz, &event)?);
        }

        Ok(results)
    }

    fn equilux_for_event(
        &self,
        location: &Location,
        tz: &Tz,
        event: &SeasonEvent,
    ) -> Result<EquiluxResult> {
        let (t0, t1) = search_window(&self.ts, event.kind, &event.time)?;
        let events = self.provider.sun_events(location, &t0, &t1)?;
        let intervals = day_intervals(&events, tz);
        debug!(
            "{}: {} sun events, {} daylight intervals in window",
            event.kind,
            events.len(),
            intervals.len()
        );

        let chosen = closest_to_twelve(&intervals).ok_or(EquiluxError::NoEquiluxFound {
            start_jd: t0.ut(),
            end_jd: t1.ut(),
        })?;

        Ok(format_result(event.time.in_zone(tz), chosen))
    }
}
