//! Event search over time-dependent functions
//!
//! [`find_discrete`] locates the instants at which a discrete classification
//! of time changes value, by scanning at a coarse step and repeatedly
//! subdividing each bracket that straddles a transition until the bracket
//! width falls below a tolerance. Season boundaries and horizon crossings
//! are both found this way.

use crate::constants::DAY_S;
use crate::errors::{EquiluxError, Result};

/// Default convergence threshold for event finding (0.001 seconds in days)
pub const EPSILON_DISCRETE: f64 = 0.001 / DAY_S;

/// Default number of subdivision points per bracket refinement
pub const DEFAULT_NUM: usize = 12;

/// Tuning knobs for [`find_discrete`].
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Sampling interval in days for the initial scan. Must be shorter than
    /// the spacing between consecutive events or events are skipped.
    pub step_days: f64,
    /// Convergence threshold in days
    pub epsilon: f64,
    /// Number of subdivision points per bracket refinement
    pub num: usize,
}

impl SearchOptions {
    /// Options with the given scan step and default refinement settings.
    pub fn with_step(step_days: f64) -> Self {
        SearchOptions {
            step_days,
            epsilon: EPSILON_DISCRETE,
            num: DEFAULT_NUM,
        }
    }
}

/// Find times at which a discrete function of time changes value.
///
/// `f` maps a slice of Julian dates to one integer state per date. The
/// returned pairs give the converged event time and the state the function
/// changed *to* at that time, in ascending time order.
pub fn find_discrete<F>(
    jd_start: f64,
    jd_end: f64,
    f: &mut F,
    options: SearchOptions,
) -> Result<Vec<(f64, i64)>>
where
    F: FnMut(&[f64]) -> Vec<i64>,
{
    if jd_start >= jd_end {
        return Err(EquiluxError::InvalidSearchRange {
            start_jd: jd_start,
            end_jd: jd_end,
        });
    }

    let sample_count = ((jd_end - jd_start) / options.step_days) as usize + 2;
    let mut jd = linspace(jd_start, jd_end, sample_count);

    let end_mask = linspace(0.0, 1.0, options.num);
    let start_mask: Vec<f64> = end_mask.iter().copied().rev().collect();

    loop {
        let y = f(&jd);

        let mut starts = Vec::new();
        let mut ends = Vec::new();
        let mut values = Vec::new();
        for i in 1..y.len() {
            if y[i - 1] != y[i] {
                starts.push(jd[i - 1]);
                ends.push(jd[i]);
                values.push(y[i]);
            }
        }

        if starts.is_empty() {
            return Ok(Vec::new());
        }

        let max_width = starts
            .iter()
            .zip(ends.iter())
            .map(|(s, e)| e - s)
            .fold(0.0_f64, f64::max);

        if max_width <= options.epsilon {
            return Ok(ends.into_iter().zip(values).collect());
        }

        jd = subdivide(&starts, &start_mask, &ends, &end_mask);
    }
}

/// Generate `n` evenly spaced values from `start` to `end` (inclusive).
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Replace each bracket `(starts[i], ends[i])` with `num` interior sample
/// points, `starts[i] * start_mask[j] + ends[i] * end_mask[j]`.
fn subdivide(starts: &[f64], start_mask: &[f64], ends: &[f64], end_mask: &[f64]) -> Vec<f64> {
    let mut refined = Vec::with_capacity(starts.len() * start_mask.len());
    for (&s, &e) in starts.iter().zip(ends.iter()) {
        for (&a, &b) in start_mask.iter().zip(end_mask.iter()) {
            refined.push(s * a + e * b);
        }
    }
    refined
}
