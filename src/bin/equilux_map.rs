//! Equilux command-line driver
//!
//! Computes the equilux (the day nearest an equinox whose daylight is
//! closest to exactly 12 hours) for a single location, the year's sunrise
//! and sunset extremes, or a whole latitude/longitude grid exported as CSV.
//!
//! # Usage
//!
//! ```bash
//! # One location, both equinoxes
//! cargo run --release --bin equilux_map -- point \
//!     --lat 40.7128 --lon -74.0060 --timezone America/New_York --year 2025
//!
//! # Earliest/latest sunrise and sunset for the year
//! cargo run --release --bin equilux_map -- extremes \
//!     --lat 40.7128 --lon -74.0060 --timezone America/New_York --year 2025
//!
//! # Sweep the lower-48 bounding box at half-degree spacing
//! cargo run --release --bin equilux_map -- grid \
//!     --min-lat 24.5 --max-lat 49.5 --min-lon -125.0 --max-lon -66.9 \
//!     --step 0.5 --timezone America/Chicago --output equilux_map.csv
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use equilux::{
    grid_points, run_grid, sun_extremes, write_csv, Equinox, EquiluxCalculator, GridConfig,
    Location, Result, ResultCache, SolarProvider,
};

#[derive(Parser)]
#[command(
    name = "equilux_map",
    version = env!("CARGO_PKG_VERSION"),
    about = "Find the day nearest an equinox with daylight closest to 12 hours",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the equilux for one location
    Point {
        /// Latitude in degrees, north positive
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees, east positive
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        lon: f64,

        /// IANA timezone name, e.g. America/New_York
        #[arg(long, value_name = "ZONE")]
        timezone: String,

        /// Year to search
        #[arg(long, default_value_t = 2025)]
        year: i32,

        /// Equinox to search around (vernal or autumnal); may be given
        /// twice, defaults to both
        #[arg(long = "equinox", value_parser = parse_equinox)]
        equinoxes: Vec<Equinox>,
    },

    /// Find the year's earliest and latest sunrise and sunset
    Extremes {
        /// Latitude in degrees, north positive
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees, east positive
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        lon: f64,

        /// IANA timezone name
        #[arg(long, value_name = "ZONE")]
        timezone: String,

        /// Year to scan
        #[arg(long, default_value_t = 2025)]
        year: i32,
    },

    /// Sweep a bounding box and write the equilux table as CSV
    Grid {
        /// Southern edge of the box, degrees
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        min_lat: f64,

        /// Northern edge of the box, degrees
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        max_lat: f64,

        /// Western edge of the box, degrees
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        min_lon: f64,

        /// Eastern edge of the box, degrees
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        max_lon: f64,

        /// Degrees between neighboring points
        #[arg(long, default_value_t = 0.5)]
        step: f64,

        /// Year to search
        #[arg(long, default_value_t = 2025)]
        year: i32,

        /// IANA timezone applied to every grid point
        #[arg(long, value_name = "ZONE")]
        timezone: String,

        /// Equinox to search around
        #[arg(long, value_parser = parse_equinox, default_value = "autumnal")]
        equinox: Equinox,

        /// Output CSV path
        #[arg(long, value_name = "FILE", default_value = "equilux_map.csv")]
        output: PathBuf,

        /// Cache directory (default: ~/.cache/equilux)
        #[arg(long, value_name = "DIR")]
        cache_dir: Option<PathBuf>,

        /// Discard cached results before the sweep
        #[arg(long)]
        refresh: bool,
    },
}

fn parse_equinox(s: &str) -> std::result::Result<Equinox, String> {
    match s.to_ascii_lowercase().as_str() {
        "vernal" | "spring" | "march" => Ok(Equinox::Vernal),
        "autumnal" | "fall" | "september" => Ok(Equinox::Autumnal),
        other => Err(format!(
            "unknown equinox {other:?} (expected vernal or autumnal)"
        )),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Point {
            lat,
            lon,
            timezone,
            year,
            equinoxes,
        } => point(lat, lon, timezone, year, &equinoxes),
        Commands::Extremes {
            lat,
            lon,
            timezone,
            year,
        } => extremes(lat, lon, timezone, year),
        Commands::Grid {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            step,
            year,
            timezone,
            equinox,
            output,
            cache_dir,
            refresh,
        } => {
            let config = GridConfig {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
                step_deg: step,
                year,
                timezone,
                equinox,
            };
            grid(&config, &output, cache_dir, refresh)
        }
    }
}

fn point(lat: f64, lon: f64, timezone: String, year: i32, equinoxes: &[Equinox]) -> Result<()> {
    let labels = if equinoxes.is_empty() {
        vec![Equinox::Vernal, Equinox::Autumnal]
    } else {
        equinoxes.to_vec()
    };

    let calculator = EquiluxCalculator::new(SolarProvider::new());
    let location = Location::new(lat, lon, timezone);
    let results = calculator.compute(&location, year, &labels)?;

    for (label, result) in &results {
        println!(
            "{} Equinox  {}",
            label,
            result.equinox.format("%Y-%m-%d %H:%M:%S %:z")
        );
        println!(
            "{} Equilux  {} ({})",
            label,
            result.date,
            result.sunset.format("%a")
        );
        println!(
            "  sunrise   {}",
            result.sunrise.format("%Y-%m-%d %H:%M:%S %:z")
        );
        println!(
            "  sunset    {}",
            result.sunset.format("%Y-%m-%d %H:%M:%S %:z")
        );
        println!("  daylight  {}, {}", result.daylight, result.deviation);
        println!();
    }
    Ok(())
}

fn extremes(lat: f64, lon: f64, timezone: String, year: i32) -> Result<()> {
    let provider = SolarProvider::new();
    let location = Location::new(lat, lon, timezone.clone());
    let extremes = sun_extremes(&provider, &location, year)?;

    println!("Sun extremes for {year} at ({lat}, {lon}) {timezone}");
    let format = "%Y-%m-%d %H:%M:%S %:z";
    println!(
        "  earliest sunrise  {}",
        extremes.earliest_sunrise.format(format)
    );
    println!(
        "  latest sunrise    {}",
        extremes.latest_sunrise.format(format)
    );
    println!(
        "  earliest sunset   {}",
        extremes.earliest_sunset.format(format)
    );
    println!(
        "  latest sunset     {}",
        extremes.latest_sunset.format(format)
    );
    Ok(())
}

fn grid(
    config: &GridConfig,
    output: &Path,
    cache_dir: Option<PathBuf>,
    refresh: bool,
) -> Result<()> {
    let cache = match cache_dir {
        Some(dir) => ResultCache::with_path(dir),
        None => ResultCache::new()?,
    };
    if refresh {
        let removed = cache.clear()?;
        println!("Cleared {removed} cached results");
    }

    let calculator = EquiluxCalculator::new(SolarProvider::new());
    let total = grid_points(config).len();
    let cells = run_grid(&calculator, &cache, config);
    write_csv(&cells, output)?;

    println!(
        "Computed {}/{} grid points; wrote {}",
        cells.len(),
        total,
        output.display()
    );
    Ok(())
}
