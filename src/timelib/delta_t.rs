//! Delta-T (TT - UT) computation from piecewise polynomial expressions
//!
//! Implements the Espenak-Meeus polynomial fits: one expression per historical
//! era from before -500 through the post-2150 long-term parabola, joined at
//! the published era boundaries. Input is a decimal year; output is seconds.

/// Compute delta-T in seconds for a decimal year.
///
/// Accurate to a few seconds over the telescopic era and to the published
/// fit quality elsewhere. The far past and far future fall back on the
/// long-term parabola `-20 + 32 * ((y - 1820) / 100)^2`.
pub fn delta_t_seconds(year: f64) -> f64 {
    let y = year;

    if y < -500.0 {
        let u = (y - 1820.0) / 100.0;
        return -20.0 + 32.0 * u * u;
    }
    if y < 500.0 {
        let u = y / 100.0;
        return poly(
            u,
            &[
                10583.6,
                -1014.41,
                33.78311,
                -5.952053,
                -0.1798452,
                0.022174192,
                0.0090316521,
            ],
        );
    }
    if y < 1600.0 {
        let u = (y - 1000.0) / 100.0;
        return poly(
            u,
            &[
                1574.2,
                -556.01,
                71.23472,
                0.319781,
                -0.8503463,
                -0.005050998,
                0.0083572073,
            ],
        );
    }
    if y < 1700.0 {
        let t = y - 1600.0;
        return 120.0 - 0.9808 * t - 0.01532 * t * t + t * t * t / 7129.0;
    }
    if y < 1800.0 {
        let t = y - 1700.0;
        return poly(t, &[8.83, 0.1603, -0.0059285, 0.00013336]) - t.powi(4) / 1_174_000.0;
    }
    if y < 1860.0 {
        let t = y - 1800.0;
        return poly(
            t,
            &[
                13.72,
                -0.332447,
                0.0068612,
                0.0041116,
                -0.00037436,
                0.0000121272,
                -0.0000001699,
                0.000000000875,
            ],
        );
    }
    if y < 1900.0 {
        let t = y - 1860.0;
        return poly(t, &[7.62, 0.5737, -0.251754, 0.01680668, -0.0004473624])
            + t.powi(5) / 233_174.0;
    }
    if y < 1920.0 {
        let t = y - 1900.0;
        return poly(t, &[-2.79, 1.494119, -0.0598939, 0.0061966, -0.000197]);
    }
    if y < 1941.0 {
        let t = y - 1920.0;
        return poly(t, &[21.20, 0.84493, -0.076100, 0.0020936]);
    }
    if y < 1961.0 {
        let t = y - 1950.0;
        return 29.07 + 0.407 * t - t * t / 233.0 + t * t * t / 2547.0;
    }
    if y < 1986.0 {
        let t = y - 1975.0;
        return 45.45 + 1.067 * t - t * t / 260.0 - t * t * t / 718.0;
    }
    if y < 2005.0 {
        let t = y - 2000.0;
        return poly(
            t,
            &[
                63.86,
                0.3345,
                -0.060374,
                0.0017275,
                0.000651814,
                0.00002373599,
            ],
        );
    }
    if y < 2050.0 {
        let t = y - 2000.0;
        return 62.92 + 0.32217 * t + 0.005589 * t * t;
    }
    if y < 2150.0 {
        let u = (y - 1820.0) / 100.0;
        return -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y);
    }

    let u = (y - 1820.0) / 100.0;
    -20.0 + 32.0 * u * u
}

/// Evaluate a polynomial with coefficients in ascending order via Horner's method.
fn poly(x: f64, coeffs: &[f64]) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
