// src/mc/payoffs.rs
//! Payoff and Discount Evaluation
//!
//! # Mathematical Definitions
//!
//! - **Call payoff**: `max(S_T - K, 0)` per path
//! - **Price estimate**: `e^{-rT} * mean(payoff)`
//! - **Standard error**: `e^{-rT} * std(payoff) / √N`
//!
//! The discount factor converts a payoff realised at maturity into its
//! present value under the risk-neutral measure.
//!
//! # Implementation Notes
//!
//! Reductions run in fixed-size chunks combined in order, so the estimate
//! and its standard error are bit-identical for any thread count.

use crate::error::{SdeError, SdeResult};
use crate::math_utils::sample_mean_std;
use crate::mc::mc_engine::SimulationConfig;
use crate::mc::paths::PathTensor;
use ndarray::ArrayView1;

/// European call payoff for a terminal price.
#[inline]
pub fn european_call(s_t: f64, k: f64) -> f64 {
    (s_t - k).max(0.0)
}

/// Discounted Monte Carlo price of the call, with its sampling error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEstimate {
    /// `e^{-rT} * mean(payoff)`
    pub price: f64,
    /// Standard error of `price` (discounted).
    pub std_error: f64,
    /// Undiscounted mean payoff at maturity.
    pub mean_payoff: f64,
    pub discount_factor: f64,
    pub paths: usize,
}

impl PriceEstimate {
    /// `price ± z * std_error`; `z = 1.96` gives a 95% interval.
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        (self.price - z * self.std_error, self.price + z * self.std_error)
    }

    /// Number of standard errors between the estimate and `reference`.
    /// Infinite when the estimate has no spread and misses the reference.
    pub fn z_score(&self, reference: f64) -> f64 {
        let diff = self.price - reference;
        if self.std_error > 0.0 {
            diff / self.std_error
        } else if diff == 0.0 {
            0.0
        } else {
            diff.signum() * f64::INFINITY
        }
    }
}

/// Price the call from the terminal prices of every path.
///
/// # Errors
///
/// - `InvalidConfiguration` if `terminal` is empty
/// - `NumericalAnomaly` if the estimate is not finite
pub fn evaluate_terminal(
    terminal: ArrayView1<'_, f64>,
    cfg: &SimulationConfig,
) -> SdeResult<PriceEstimate> {
    let n = terminal.len();
    if n == 0 {
        return Err(SdeError::InvalidConfiguration {
            field: "paths".to_string(),
            reason: "no terminal prices to average".to_string(),
        });
    }

    let k = cfg.k;
    let payoffs: Vec<f64> = terminal.iter().map(|&s_t| european_call(s_t, k)).collect();
    let (mean_payoff, payoff_std) = sample_mean_std(&payoffs);

    let discount_factor = cfg.discount_factor();
    let price = discount_factor * mean_payoff;
    let std_error = discount_factor * payoff_std / (n as f64).sqrt();

    for (stage, value) in [("price estimate", price), ("standard error", std_error)] {
        if !value.is_finite() {
            return Err(SdeError::NumericalAnomaly {
                stage: stage.to_string(),
                path: n,
                step: cfg.steps,
                value,
            });
        }
    }

    Ok(PriceEstimate {
        price,
        std_error,
        mean_payoff,
        discount_factor,
        paths: n,
    })
}

/// Price the call from a fully populated path tensor (its last column).
pub fn evaluate_paths(paths: &PathTensor, cfg: &SimulationConfig) -> SdeResult<PriceEstimate> {
    let last = paths.ncols().checked_sub(1).ok_or_else(|| SdeError::InvalidConfiguration {
        field: "paths".to_string(),
        reason: "path tensor has no columns".to_string(),
    })?;
    evaluate_terminal(paths.column(last), cfg)
}
