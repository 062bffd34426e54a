//! Batch equilux computation over a latitude/longitude grid
//!
//! Sweeps a bounding box in fixed-degree steps, computes the equilux at
//! every point, and aggregates the results into a flat table suitable for
//! CSV export or plotting. Points are independent, so the sweep runs in
//! parallel; per-point failures (polar sites with no sunrise, bad
//! timezones) are logged and skipped rather than aborting the whole grid.

use std::path::Path;

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::almanac::{EphemerisProvider, Location};
use crate::cache::{CacheKey, ResultCache};
use crate::equilux::{Equinox, EquiluxCalculator, EquiluxResult};
use crate::errors::Result;
use crate::timelib::weekday_abbrev;

/// A rectangular sweep of observer positions, all sharing one timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    /// Spacing between neighboring points, in degrees
    pub step_deg: f64,
    pub year: i32,
    /// IANA timezone applied to every point
    pub timezone: String,
    pub equinox: Equinox,
}

/// One row of the aggregated grid table.
///
/// `off_by_seconds` is the signed offset of the equilux day's daylight from
/// exactly 12 hours; negative means the day fell shy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub latitude: f64,
    pub longitude: f64,
    /// Local calendar date of the equilux at this point
    pub date: NaiveDate,
    /// Three-letter weekday of that date, for marker styling downstream
    pub weekday: String,
    pub off_by_seconds: f64,
}

/// Enumerates the grid positions in row-major order: latitude sweeps the
/// outer loop and longitude the inner one, both ascending, with the bounds
/// themselves included. Coordinates are rounded to two decimals so filenames
/// and table rows stay tidy. A non-positive step yields no points.
pub fn grid_points(config: &GridConfig) -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    if config.step_deg <= 0.0 {
        return points;
    }

    let mut row = 0;
    loop {
        let latitude = round2(config.min_lat + row as f64 * config.step_deg);
        if latitude > config.max_lat {
            break;
        }
        let mut col = 0;
        loop {
            let longitude = round2(config.min_lon + col as f64 * config.step_deg);
            if longitude > config.max_lon {
                break;
            }
            points.push((latitude, longitude));
            col += 1;
        }
        row += 1;
    }
    points
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the equilux at every grid position and returns one cell per
/// point that succeeded, in grid order regardless of scheduling.
///
/// Results are served from `cache` when a matching entry exists; fresh
/// computations are written back so reruns over an enlarged or shifted box
/// only pay for the new points. Failures at individual points are logged at
/// warn level and their cells omitted.
pub fn run_grid<P>(
    calculator: &EquiluxCalculator<P>,
    cache: &ResultCache,
    config: &GridConfig,
) -> Vec<GridCell>
where
    P: EphemerisProvider + Sync,
{
    let points = grid_points(config);
    info!(
        "sweeping {} grid points for the {} {} equilux",
        points.len(),
        config.year,
        config.equinox
    );

    let progress = ProgressBar::new(points.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {percent}% {pos}/{len} points")
            .unwrap()
            .progress_chars("##-"),
    );

    let cells: Vec<Option<GridCell>> = points
        .par_iter()
        .map(|&(latitude, longitude)| {
            let cell = grid_cell(calculator, cache, config, latitude, longitude);
            progress.inc(1);
            match cell {
                Ok(cell) => Some(cell),
                Err(err) => {
                    warn!("skipping grid point ({latitude}, {longitude}): {err}");
                    None
                }
            }
        })
        .collect();
    progress.finish_and_clear();

    cells.into_iter().flatten().collect()
}

fn grid_cell<P: EphemerisProvider>(
    calculator: &EquiluxCalculator<P>,
    cache: &ResultCache,
    config: &GridConfig,
    latitude: f64,
    longitude: f64,
) -> Result<GridCell> {
    let location = Location::new(latitude, longitude, config.timezone.clone());
    let key = CacheKey::new(&location, config.year, &[config.equinox]);

    if let Some(mut cached) = cache.get(&key) {
        if let Some(result) = cached.remove(&config.equinox) {
            return Ok(to_cell(latitude, longitude, &result));
        }
        // entry exists but predates this label; recompute below
    }

    let mut results = calculator.compute(&location, config.year, &[config.equinox])?;
    if let Err(err) = cache.put(&key, &results) {
        warn!("cache write failed for ({latitude}, {longitude}): {err}");
    }
    let result = results
        .remove(&config.equinox)
        .expect("compute returns every requested equinox");
    Ok(to_cell(latitude, longitude, &result))
}

fn to_cell(latitude: f64, longitude: f64, result: &EquiluxResult) -> GridCell {
    GridCell {
        latitude,
        longitude,
        date: result.date,
        weekday: weekday_abbrev(&result.sunset).to_string(),
        off_by_seconds: result.deviation.seconds,
    }
}

/// Writes the grid table to `path` as CSV with a header row.
pub fn write_csv(cells: &[GridCell], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for cell in cells {
        writer.serialize(cell)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::almanac::mock::MockProvider;
    use crate::almanac::{SeasonEvent, SeasonKind, SunEvent};
    use crate::timelib::Timescale;
    use approx::assert_relative_eq;
    use std::path::PathBuf;

    fn config() -> GridConfig {
        GridConfig {
            min_lat: 40.0,
            max_lat: 41.0,
            min_lon: -75.0,
            max_lon: -74.0,
            step_deg: 0.5,
            year: 2025,
            timezone: "UTC".to_string(),
            equinox: Equinox::Autumnal,
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        std::env::temp_dir().join(format!("equilux_grid_{}_{}", tag, nanos))
    }

    /// Provider with one autumnal equinox and three rise/set pairs around
    /// it, the middle day closest to 12 hours. Events ignore the observer,
    /// so every grid point sees the same sky.
    fn canned_provider() -> MockProvider {
        let ts = Timescale::new();
        let equinox = SeasonEvent {
            time: ts.utc_time(2025, 9, 22, 18, 19, 16.0),
            kind: SeasonKind::AutumnalEquinox,
        };

        let mut sun = Vec::new();
        for (day, duration_hours) in [(22, 12.1), (23, 11.995), (24, 11.9)] {
            let rise = ts.utc_time(2025, 9, day, 6, 0, 0.0);
            let set = ts.ut_jd(rise.ut() + duration_hours / 24.0);
            sun.push(SunEvent {
                time: rise,
                rising: true,
            });
            sun.push(SunEvent {
                time: set,
                rising: false,
            });
        }

        MockProvider::new()
            .with_seasons(vec![equinox])
            .with_sun_events(sun)
    }

    #[test]
    fn test_grid_points_row_major() {
        let points = grid_points(&config());

        assert_eq!(points.len(), 9);
        assert_eq!(points[0], (40.0, -75.0));
        assert_eq!(points[1], (40.0, -74.5));
        assert_eq!(points[2], (40.0, -74.0));
        assert_eq!(points[3], (40.5, -75.0));
        assert_eq!(points[8], (41.0, -74.0));
    }

    #[test]
    fn test_grid_points_rounded_to_two_decimals() {
        let mut config = config();
        config.min_lat = 40.123;
        config.min_lon = -74.987;
        config.step_deg = 0.5;

        let points = grid_points(&config);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], (40.12, -74.99));
        assert_eq!(points[1], (40.12, -74.49));
        assert_eq!(points[2], (40.62, -74.99));
        assert_eq!(points[3], (40.62, -74.49));
    }

    #[test]
    fn test_grid_points_includes_bounds() {
        let mut config = config();
        config.step_deg = 1.0;

        let points = grid_points(&config);
        assert_eq!(
            points,
            vec![
                (40.0, -75.0),
                (40.0, -74.0),
                (41.0, -75.0),
                (41.0, -74.0),
            ]
        );
    }

    #[test]
    fn test_grid_points_nonpositive_step_is_empty() {
        let mut config = config();
        config.step_deg = 0.0;
        assert!(grid_points(&config).is_empty());

        config.step_deg = -0.5;
        assert!(grid_points(&config).is_empty());
    }

    #[test]
    fn test_run_grid_fills_every_point_in_order() {
        let dir = temp_dir("fills");
        let cache = ResultCache::with_path(dir.clone());
        let calculator = EquiluxCalculator::new(canned_provider());

        let cells = run_grid(&calculator, &cache, &config());

        assert_eq!(cells.len(), 9);
        assert_eq!((cells[0].latitude, cells[0].longitude), (40.0, -75.0));
        assert_eq!((cells[1].latitude, cells[1].longitude), (40.0, -74.5));
        assert_eq!((cells[8].latitude, cells[8].longitude), (41.0, -74.0));

        // 11.995 h day wins: 18 seconds shy, so the offset is negative
        for cell in &cells {
            assert_eq!(cell.date, NaiveDate::from_ymd_opt(2025, 9, 23).unwrap());
            assert_eq!(cell.weekday, "Tue");
            assert!(cell.off_by_seconds < 0.0);
            assert_relative_eq!(cell.off_by_seconds, -18.0, epsilon = 0.1);
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_grid_writes_cache_entries() {
        let dir = temp_dir("writes");
        let cache = ResultCache::with_path(dir.clone());
        let calculator = EquiluxCalculator::new(canned_provider());

        run_grid(&calculator, &cache, &config());

        let entries = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .count();
        assert_eq!(entries, 9);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_grid_serves_reruns_from_cache() {
        let dir = temp_dir("reruns");
        let cache = ResultCache::with_path(dir.clone());
        let calculator = EquiluxCalculator::new(canned_provider());

        let first = run_grid(&calculator, &cache, &config());

        // A provider with no sky at all: every fresh computation would fail,
        // so matching results can only have come from the cache.
        let empty = EquiluxCalculator::new(MockProvider::new());
        let second = run_grid(&empty, &cache, &config());

        assert_eq!(first, second);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_grid_skips_failing_points() {
        let dir = temp_dir("skips");
        let cache = ResultCache::with_path(dir.clone());

        // Seasons but no sun events: every point fails and is skipped.
        let ts = Timescale::new();
        let provider = MockProvider::new().with_seasons(vec![SeasonEvent {
            time: ts.utc_time(2025, 9, 22, 18, 19, 16.0),
            kind: SeasonKind::AutumnalEquinox,
        }]);
        let calculator = EquiluxCalculator::new(provider);

        let cells = run_grid(&calculator, &cache, &config());
        assert!(cells.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_csv_shape() {
        let dir = temp_dir("csv");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("grid.csv");

        let cells = vec![GridCell {
            latitude: 40.5,
            longitude: -74.5,
            date: NaiveDate::from_ymd_opt(2025, 9, 25).unwrap(),
            weekday: "Thu".to_string(),
            off_by_seconds: -42.3,
        }];
        write_csv(&cells, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("latitude,longitude,date,weekday,off_by_seconds")
        );
        assert_eq!(lines.next(), Some("40.5,-74.5,2025-09-25,Thu,-42.3"));
        assert_eq!(lines.next(), None);

        std::fs::remove_dir_all(&dir).ok();
    }
}
