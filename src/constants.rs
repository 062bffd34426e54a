//! Shared numeric constants

/// Seconds per day
pub const DAY_S: f64 = 86_400.0;

/// Julian date of the J2000.0 epoch (2000 January 1.5 TT)
pub const J2000: f64 = 2_451_545.0;

/// Julian date of the Unix epoch (1970 January 1.0 UTC)
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Days per Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;
