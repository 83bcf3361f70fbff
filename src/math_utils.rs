// src/math_utils.rs
use crate::error::{SdeError, SdeResult};
use ndarray::{Array2, ShapeBuilder};
use rayon::prelude::*;
use statrs::function::erf;
use std::f64::consts::SQRT_2;
use std::time::{Duration, Instant};

/// Fixed chunk length for order-stable parallel reductions.
pub const REDUCTION_CHUNK: usize = 4096;

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

pub struct Timer {
    start_time: Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new()
    }
}

/// Allocate a zeroed column-major `rows x cols` table, reporting failure
/// instead of aborting.
///
/// Column-major keeps every time step of a path table contiguous, which is
/// the access pattern of the stage-by-stage propagation.
pub fn try_alloc_matrix(what: &str, rows: usize, cols: usize) -> SdeResult<Array2<f64>> {
    let exhausted = || SdeError::ResourceExhausted {
        what: what.to_string(),
        rows,
        cols,
    };

    let len = rows
        .checked_mul(cols)
        .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<f64>())
        .ok_or_else(exhausted)?;

    let mut data: Vec<f64> = Vec::new();
    data.try_reserve_exact(len).map_err(|_| exhausted())?;
    data.resize(len, 0.0);

    Array2::from_shape_vec((rows, cols).f(), data).map_err(|_| exhausted())
}

/// Sum of `f(x)` over `values`, reduced in fixed-size chunks and combined in
/// order so the result does not depend on the rayon thread count.
pub fn chunked_sum<F>(values: &[f64], f: F) -> f64
where
    F: Fn(f64) -> f64 + Sync,
{
    let partials: Vec<f64> = values
        .par_chunks(REDUCTION_CHUNK)
        .map(|chunk| chunk.iter().map(|&x| f(x)).sum::<f64>())
        .collect();
    partials.iter().sum()
}

/// Two-pass sample mean and standard deviation (N - 1 denominator).
///
/// Returns a standard deviation of 0 for fewer than two samples.
pub fn sample_mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = chunked_sum(values, |x| x) / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }
    let sum_sq_dev = chunked_sum(values, |x| (x - mean) * (x - mean));
    (mean, (sum_sq_dev / (n - 1) as f64).sqrt())
}
