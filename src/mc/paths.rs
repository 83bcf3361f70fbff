// src/mc/paths.rs
//! Path Propagation
//!
//! # Scheme
//!
//! Exact log-space GBM update applied one time step at a time:
//! ```text
//! S[i, 0] = S_0
//! S[i, t] = S[i, t-1] * exp((r - σ²/2) dt + σ √dt * Z[i, t-1]),   t = 1..steps
//! ```
//!
//! # Stage Pipeline
//!
//! Each time step is one data-parallel stage over all paths. A stage reads
//! only the previous column of the tensor and the matching innovation
//! column, so the time axis is the only sequential dependency and results
//! are identical for any thread count.
//!
//! # Memory Layout
//!
//! Tensors are column-major: column `t` (all paths at step `t`) is
//! contiguous.

use crate::error::{validation, SdeError, SdeResult};
use crate::math_utils::try_alloc_matrix;
use crate::mc::mc_engine::SimulationConfig;
use crate::rng::InnovationMatrix;
use ndarray::parallel::prelude::*;
use ndarray::{Array2, Axis, Zip};
use tracing::warn;

/// `paths x (steps + 1)` price table; column 0 holds the spot price.
pub type PathTensor = Array2<f64>;

/// Propagate a full run's innovations into its path tensor.
///
/// The innovation table is consumed: it drives exactly one tensor.
///
/// # Errors
///
/// - `InvalidConfiguration` if `innovations` is not `cfg.paths x cfg.steps`
/// - `ResourceExhausted` if the tensor cannot be allocated
/// - `NumericalAnomaly` if any price is non-positive or non-finite
pub fn propagate(cfg: &SimulationConfig, innovations: InnovationMatrix) -> SdeResult<PathTensor> {
    validation::validate_shape("innovations", innovations.dim(), (cfg.paths, cfg.steps))?;
    propagate_block(cfg, 0, innovations)
}

/// Propagate a block of rows starting at global path `first_path`.
///
/// Only the step count is checked against `cfg`; the block may hold any
/// positive number of paths.
pub fn propagate_block(
    cfg: &SimulationConfig,
    first_path: usize,
    innovations: InnovationMatrix,
) -> SdeResult<PathTensor> {
    let (rows, steps) = innovations.dim();
    validation::validate_non_zero("innovation rows", rows)?;
    if steps != cfg.steps {
        return Err(SdeError::InvalidConfiguration {
            field: "innovations".to_string(),
            reason: format!(
                "has {} columns but the configuration has {} steps",
                steps, cfg.steps
            ),
        });
    }

    let step = cfg.model().step_coefficients(cfg.dt());
    let mut paths = try_alloc_matrix("path tensor", rows, steps + 1)?;
    paths.column_mut(0).fill(cfg.s0);

    for t in 1..=steps {
        let (done, mut rest) = paths.view_mut().split_at(Axis(1), t);
        Zip::from(rest.column_mut(0))
            .and(done.column(t - 1))
            .and(innovations.column(t - 1))
            .par_for_each(|s, &prev, &z| *s = step.advance(prev, z));
    }

    if let Some((path, t, value)) = find_anomaly(&paths) {
        let path = first_path + path;
        warn!(path, step = t, value, "non-positive or non-finite simulated price");
        return Err(SdeError::NumericalAnomaly {
            stage: "path propagation".to_string(),
            path,
            step: t,
            value,
        });
    }

    Ok(paths)
}

/// First `(row, step, value)` in row order whose price is not a positive
/// finite number.
pub fn find_anomaly(paths: &PathTensor) -> Option<(usize, usize, f64)> {
    paths
        .axis_iter(Axis(0))
        .into_par_iter()
        .enumerate()
        .find_map_first(|(i, row)| {
            row.iter()
                .position(|&s| !(s.is_finite() && s > 0.0))
                .map(|t| (i, t, row[t]))
        })
}

/// Copy of the first `rows` paths, for collaborators that plot them.
pub fn export_rows(paths: &PathTensor, rows: usize) -> PathTensor {
    let rows = rows.min(paths.nrows());
    paths.slice(ndarray::s![..rows, ..]).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::rng::generate_innovations;
    use ndarray::Array2;

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            paths: 200,
            steps: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_column_is_spot() {
        let cfg = small_config();
        let z = generate_innovations(cfg.paths, cfg.steps, Some(1)).unwrap();
        let paths = propagate(&cfg, z).unwrap();
        assert_eq!(paths.dim(), (cfg.paths, cfg.steps + 1));
        assert!(paths.column(0).iter().all(|&s| s == cfg.s0));
    }

    #[test]
    fn test_step_recurrence() {
        let cfg = small_config();
        let z = generate_innovations(cfg.paths, cfg.steps, Some(2)).unwrap();
        let paths = propagate(&cfg, z.clone()).unwrap();

        let dt = cfg.dt();
        let drift = (cfg.r - 0.5 * cfg.sigma * cfg.sigma) * dt;
        let vol = cfg.sigma * dt.sqrt();
        for i in 0..cfg.paths {
            let mut log_sum = 0.0;
            for t in 1..=cfg.steps {
                let expected = paths[[i, t - 1]] * (drift + vol * z[[i, t - 1]]).exp();
                let rel = (paths[[i, t]] - expected).abs() / expected;
                assert!(rel <= 1e-9, "step recurrence broken at ({}, {}): {}", i, t, rel);

                // Compounded steps agree with the closed form in log space.
                log_sum += drift + vol * z[[i, t - 1]];
                let closed = cfg.s0 * log_sum.exp();
                let rel = (paths[[i, t]] - closed).abs() / closed;
                assert!(rel <= 1e-9 * t as f64, "drift from closed form at ({}, {})", i, t);
            }
        }
    }

    #[test]
    fn test_prices_positive_and_finite() {
        let cfg = SimulationConfig {
            paths: 500,
            steps: 252,
            sigma: 0.8,
            ..Default::default()
        };
        let z = generate_innovations(cfg.paths, cfg.steps, Some(3)).unwrap();
        let paths = propagate(&cfg, z).unwrap();
        assert!(paths.iter().all(|&s| s.is_finite() && s > 0.0));
    }

    #[test]
    fn test_zero_innovations_follow_drift() {
        let cfg = SimulationConfig {
            paths: 3,
            steps: 4,
            ..Default::default()
        };
        let paths = propagate(&cfg, Array2::zeros((3, 4))).unwrap();
        let growth = ((cfg.r - 0.5 * cfg.sigma * cfg.sigma) * cfg.t).exp();
        for i in 0..3 {
            let rel = (paths[[i, 4]] - cfg.s0 * growth).abs() / (cfg.s0 * growth);
            assert!(rel < 1e-12);
        }
    }

    #[test]
    fn test_shape_mismatch_is_configuration_error() {
        let cfg = small_config();
        let z = generate_innovations(cfg.paths, cfg.steps - 1, Some(1)).unwrap();
        let err = propagate(&cfg, z).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let z = generate_innovations(cfg.paths + 1, cfg.steps, Some(1)).unwrap();
        let err = propagate(&cfg, z).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_nan_innovation_is_anomaly() {
        let cfg = SimulationConfig {
            paths: 4,
            steps: 6,
            ..Default::default()
        };
        let mut z = Array2::zeros((4, 6));
        z[[2, 3]] = f64::NAN;
        let err = propagate_block(&cfg, 10, z).unwrap_err();
        match err {
            SdeError::NumericalAnomaly { path, step, .. } => {
                assert_eq!(path, 12);
                assert_eq!(step, 4);
            }
            other => panic!("expected numerical anomaly, got {:?}", other),
        }
    }

    #[test]
    fn test_overflow_is_anomaly() {
        let cfg = SimulationConfig {
            paths: 2,
            steps: 2,
            ..Default::default()
        };
        let mut z = Array2::zeros((2, 2));
        z[[0, 0]] = 1e6;
        let err = propagate(&cfg, z).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericAnomaly);
    }

    #[test]
    fn test_export_rows() {
        let cfg = small_config();
        let z = generate_innovations(cfg.paths, cfg.steps, Some(5)).unwrap();
        let paths = propagate(&cfg, z).unwrap();
        let head = export_rows(&paths, 10);
        assert_eq!(head.dim(), (10, cfg.steps + 1));
        assert_eq!(head.row(9), paths.row(9));
        assert_eq!(export_rows(&paths, 10_000).nrows(), cfg.paths);
    }
}
