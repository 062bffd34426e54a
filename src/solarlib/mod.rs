//! Analytic solar position
//!
//! Computes the Sun's apparent ecliptic longitude, equatorial coordinates,
//! and altitude above an observer's horizon from truncated trigonometric
//! series (Meeus, *Astronomical Algorithms*, chapters 22 and 25), plus the
//! Earth Rotation Angle per IAU 2000 Resolution B1.8 and Greenwich Mean
//! Sidereal Time per USNO Circular 179, Section 2.6.2.
//!
//! Good to about 0.01 degrees in longitude over several centuries around
//! J2000, which places season crossings within a quarter hour and horizon
//! crossings within a minute, comfortably inside the one-day granularity
//! the equilux search cares about.

use crate::constants::{DAYS_PER_CENTURY, J2000};
use crate::timelib::Time;

/// The Sun's geometric and apparent coordinates at one instant.
#[derive(Debug, Clone, Copy)]
pub struct SunCoordinates {
    /// Apparent ecliptic longitude in degrees [0, 360)
    pub ecliptic_longitude: f64,
    /// Apparent right ascension in degrees [0, 360)
    pub right_ascension: f64,
    /// Apparent declination in degrees
    pub declination: f64,
}

/// Compute the Sun's apparent coordinates at a TT Julian date.
pub fn sun_coordinates(jd_tt: f64) -> SunCoordinates {
    let t = (jd_tt - J2000) / DAYS_PER_CENTURY;

    // Geometric mean longitude and mean anomaly (degrees)
    let l0 = 280.46646 + t * (36_000.76983 + t * 0.000_303_2);
    let m = (357.52911 + t * (35_999.05029 - t * 0.000_153_7)).to_radians();

    // Equation of center
    let c = (1.914_602 - t * (0.004_817 + t * 0.000_014)) * m.sin()
        + (0.019_993 - t * 0.000_101) * (2.0 * m).sin()
        + 0.000_289 * (3.0 * m).sin();

    // Apparent longitude: true longitude corrected for aberration and the
    // leading nutation term
    let omega = (125.04 - 1_934.136 * t).to_radians();
    let lambda = (l0 + c - 0.005_69 - 0.004_78 * omega.sin()).rem_euclid(360.0);

    // Obliquity of the ecliptic, with the matching nutation correction
    let eps0 = 23.439_291_111
        - t * (0.013_004_167 + t * (1.638_9e-7 - t * 5.036_1e-7));
    let eps = (eps0 + 0.002_56 * omega.cos()).to_radians();

    let lambda_rad = lambda.to_radians();
    let ra = (eps.cos() * lambda_rad.sin())
        .atan2(lambda_rad.cos())
        .to_degrees()
        .rem_euclid(360.0);
    let dec = (eps.sin() * lambda_rad.sin()).asin().to_degrees();

    SunCoordinates {
        ecliptic_longitude: lambda,
        right_ascension: ra,
        declination: dec,
    }
}

/// Compute the Earth Rotation Angle (ERA) for a UT1 date.
///
/// Uses the expression from IAU Resolution B1.8 of 2000. The Julian date is
/// passed split into whole and fractional parts to preserve precision.
/// Returns a fraction between 0.0 and 1.0 representing whole rotations.
pub fn earth_rotation_angle(jd_ut_whole: f64, ut_fraction: f64) -> f64 {
    let th = 0.779_057_273_264_0 + 0.002_737_811_911_354_48 * (jd_ut_whole - J2000 + ut_fraction);
    (th.rem_euclid(1.0) + jd_ut_whole.rem_euclid(1.0) + ut_fraction).rem_euclid(1.0)
}

/// Compute Greenwich Mean Sidereal Time in hours for an instant.
///
/// Follows the "equinox method" from USNO Circular 179, Section 2.6.2, with
/// precession-in-RA terms from Capitaine et al. (2003), eq. (42).
pub fn sidereal_time(time: &Time) -> f64 {
    let ut = time.ut();
    let whole = ut.floor();
    let fraction = ut - whole;
    let theta = earth_rotation_angle(whole, fraction);

    // Precession-in-RA terms in mean sidereal time, in arcseconds
    let t = (time.tt() - J2000) / DAYS_PER_CENTURY;
    let st = 0.014506
        + ((((-0.0000000368 * t - 0.000029956) * t - 0.00000044) * t + 1.3915817) * t
            + 4612.156534)
            * t;

    // st arcseconds -> hours is /54000; theta rotations -> hours is *24
    (st / 54_000.0 + theta * 24.0).rem_euclid(24.0)
}

/// Compute the Sun's altitude above the horizon in degrees for an observer.
///
/// Geocentric apparent position against mean sidereal time; solar parallax
/// (under 9 arcseconds) is ignored. No refraction is applied here; horizon
/// event thresholds fold refraction into the target altitude instead.
pub fn sun_altitude_degrees(latitude_deg: f64, longitude_deg: f64, time: &Time) -> f64 {
    let sun = sun_coordinates(time.tt());

    let gmst_deg = sidereal_time(time) * 15.0;
    let hour_angle = (gmst_deg + longitude_deg - sun.right_ascension).to_radians();

    let lat = latitude_deg.to_radians();
    let dec = sun.declination.to_radians();

    (lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos())
        .asin()
        .to_degrees()
}
