//! Error types for equilux computation

use thiserror::Error;

use crate::almanac::SeasonKind;

/// Main error type for equilux functionality
#[derive(Error, Debug)]
pub enum EquiluxError {
    /// Error when a requested year is outside the range covered by the
    /// ephemeris provider
    #[error("year {year} is outside the ephemeris range ({min_year}..={max_year})")]
    EphemerisRange {
        year: i32,
        min_year: i32,
        max_year: i32,
    },

    /// Error when an equilux search is asked to run on a solstice or any
    /// other non-equinox season event
    #[error("cannot search for an equilux around a {0}")]
    UnsupportedEquinoxType(SeasonKind),

    /// Error when a search window produced no complete sunrise-to-sunset
    /// interval
    #[error("no complete daylight interval between JD {start_jd} and JD {end_jd}")]
    NoEquiluxFound { start_jd: f64, end_jd: f64 },

    #[error("search range is inverted: start JD {start_jd} is not before end JD {end_jd}")]
    InvalidSearchRange { start_jd: f64, end_jd: f64 },

    /// Error when a timezone identifier is not a known IANA zone name
    #[error("unknown timezone: {0:?}")]
    UnknownTimezone(String),

    /// Error when a file I/O operation fails (cache, CSV output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when a cached or serialized value cannot be encoded or decoded
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Error when writing the grid output table fails
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for equilux operations
pub type Result<T> = std::result::Result<T, EquiluxError>;
