//! Find the equilux: the day nearest an equinox with daylight closest to
//! 12 hours
//!
//! Despite the name, day and night are not equal on an equinox. Refraction
//! bends the rising and setting Sun above the horizon, and sunrise/sunset
//! are timed to the upper limb rather than the center, so the day of an
//! equinox has a little more than 12 hours of daylight. The day that comes
//! closest, the equilux, falls a few days after the September equinox and a
//! few days before the March one, and exactly which day depends on
//! latitude.
//!
//! The crate computes equinox instants and sunrise/sunset times from an
//! analytic solar model, with no ephemeris files to download, then pairs
//! them into daylight intervals and picks the one nearest 12 hours:
//!
//! ```ignore
//! let calculator = EquiluxCalculator::new(SolarProvider::new());
//! let nyc = Location::new(40.7128, -74.0060, "America/New_York");
//! let results = calculator.compute(&nyc, 2025, &[Equinox::Autumnal])?;
//! let equilux = &results[&Equinox::Autumnal];
//! println!("{} ({}, {})", equilux.date, equilux.daylight, equilux.deviation);
//! ```
//!
//! [`gridlib`] batches the same computation over a bounding box in parallel
//! and exports a CSV table; [`extremes`] finds the year's earliest and
//! latest sunrise and sunset; [`cache`] memoizes results on disk.

pub mod almanac;
pub mod cache;
pub mod constants;
pub mod equilux;
pub mod errors;
pub mod extremes;
pub mod gridlib;
pub mod searchlib;
pub mod solarlib;
pub mod timelib;

pub use almanac::{
    EphemerisProvider, Location, SeasonEvent, SeasonKind, SolarProvider, SunEvent,
};
pub use cache::{CacheKey, ResultCache};
pub use equilux::{Equinox, EquiluxCalculator, EquiluxResult};
pub use errors::{EquiluxError, Result};
pub use extremes::{sun_extremes, SunExtremes};
pub use gridlib::{grid_points, run_grid, write_csv, GridCell, GridConfig};
pub use timelib::{Time, Timescale};
