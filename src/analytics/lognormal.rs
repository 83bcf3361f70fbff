// src/analytics/lognormal.rs
//! Theoretical law of the GBM terminal price.
//!
//! Under risk-neutral GBM, `ln S_T ~ N(μ_ln, σ_ln²)` with
//! ```text
//! μ_ln = ln(S_0) + (r - σ²/2) T
//! σ_ln = σ √T
//! ```
//!
//! These parameters depend only on the configuration, never on simulated
//! data. Plotting collaborators overlay the density on a histogram of the
//! simulated terminal prices; [`LogMoments`] gives the matching numerical
//! comparison.

use crate::error::{SdeError, SdeResult};
use crate::math_utils::sample_mean_std;
use crate::mc::mc_engine::SimulationConfig;
use ndarray::ArrayView1;
use statrs::distribution::LogNormal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LognormalParams {
    pub mu_ln: f64,
    pub sigma_ln: f64,
}

impl LognormalParams {
    pub fn new(s0: f64, r: f64, sigma: f64, t: f64) -> Self {
        LognormalParams {
            mu_ln: s0.ln() + (r - 0.5 * sigma * sigma) * t,
            sigma_ln: sigma * t.sqrt(),
        }
    }

    pub fn from_config(cfg: &SimulationConfig) -> Self {
        Self::new(cfg.s0, cfg.r, cfg.sigma, cfg.t)
    }

    /// `E[S_T] = exp(μ_ln + σ_ln²/2)`, which equals `S_0 e^{rT}`.
    pub fn mean(&self) -> f64 {
        (self.mu_ln + 0.5 * self.sigma_ln * self.sigma_ln).exp()
    }

    pub fn variance(&self) -> f64 {
        let s2 = self.sigma_ln * self.sigma_ln;
        (s2.exp() - 1.0) * (2.0 * self.mu_ln + s2).exp()
    }

    /// `exp(μ_ln)`
    pub fn median(&self) -> f64 {
        self.mu_ln.exp()
    }

    /// The matching `statrs` distribution, for density/CDF evaluation.
    ///
    /// # Errors
    ///
    /// `InvalidParameters` when `σ_ln = 0`: the law is a point mass.
    pub fn to_distribution(&self) -> SdeResult<LogNormal> {
        LogNormal::new(self.mu_ln, self.sigma_ln).map_err(|e| SdeError::InvalidParameters {
            parameter: "sigma_ln".to_string(),
            value: self.sigma_ln,
            constraint: format!("log-normal scale must be positive ({})", e),
        })
    }
}

/// Sample moments of `ln S_T` over the simulated terminal prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogMoments {
    pub mean_ln: f64,
    pub std_ln: f64,
    pub samples: usize,
}

impl LogMoments {
    /// # Errors
    ///
    /// - `InvalidConfiguration` if `terminal` is empty
    /// - `NumericalAnomaly` if a price is not positive and finite
    pub fn from_terminal_prices(terminal: ArrayView1<'_, f64>) -> SdeResult<Self> {
        if terminal.is_empty() {
            return Err(SdeError::InvalidConfiguration {
                field: "terminal prices".to_string(),
                reason: "no samples".to_string(),
            });
        }
        if let Some((path, &value)) = terminal
            .iter()
            .enumerate()
            .find(|(_, &s)| !(s.is_finite() && s > 0.0))
        {
            return Err(SdeError::NumericalAnomaly {
                stage: "log-moment extraction".to_string(),
                path,
                step: 0,
                value,
            });
        }

        let logs: Vec<f64> = terminal.iter().map(|s| s.ln()).collect();
        let (mean_ln, std_ln) = sample_mean_std(&logs);
        Ok(LogMoments {
            mean_ln,
            std_ln,
            samples: logs.len(),
        })
    }

    /// Standard errors between the sample mean of `ln S_T` and `μ_ln`.
    ///
    /// A point mass (`σ_ln = 0`) scores 0 on an exact match and ±∞ otherwise.
    pub fn mean_z_score(&self, params: &LognormalParams) -> f64 {
        let diff = self.mean_ln - params.mu_ln;
        let se = params.sigma_ln / (self.samples as f64).sqrt();
        if se > 0.0 {
            diff / se
        } else if diff == 0.0 {
            0.0
        } else {
            diff.signum() * f64::INFINITY
        }
    }

    /// Relative gap between the sample and theoretical `σ_ln`.
    ///
    /// Against a point mass this is the absolute gap instead.
    pub fn std_relative_error(&self, params: &LognormalParams) -> f64 {
        let gap = (self.std_ln - params.sigma_ln).abs();
        if params.sigma_ln > 0.0 {
            gap / params.sigma_ln
        } else {
            gap
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr1;
    use statrs::distribution::{Continuous, ContinuousCDF};

    #[test]
    fn test_reference_params() {
        let p = LognormalParams::new(100.0, 0.05, 0.2, 1.0);
        assert_relative_eq!(p.mu_ln, 100f64.ln() + 0.03, epsilon = 1e-15);
        assert!((p.mu_ln - 4.625).abs() < 0.02);
        assert_relative_eq!(p.sigma_ln, 0.2, epsilon = 1e-15);
    }

    #[test]
    fn test_from_config() {
        let cfg = SimulationConfig::default();
        assert_eq!(
            LognormalParams::from_config(&cfg),
            LognormalParams::new(cfg.s0, cfg.r, cfg.sigma, cfg.t)
        );
    }

    #[test]
    fn test_mean_is_forward() {
        let p = LognormalParams::new(100.0, 0.05, 0.2, 1.0);
        assert_relative_eq!(p.mean(), 100.0 * 0.05f64.exp(), max_relative = 1e-12);
        assert_relative_eq!(p.median(), (100f64.ln() + 0.03).exp(), max_relative = 1e-12);
        assert!(p.variance() > 0.0);
    }

    #[test]
    fn test_statrs_distribution() {
        let p = LognormalParams::new(100.0, 0.05, 0.2, 1.0);
        let dist = p.to_distribution().unwrap();
        assert_relative_eq!(dist.cdf(p.median()), 0.5, epsilon = 1e-9);
        assert!(dist.pdf(p.median()) > dist.pdf(2.5 * 100.0));
    }

    #[test]
    fn test_point_mass_has_no_distribution() {
        let p = LognormalParams::new(100.0, 0.05, 0.0, 1.0);
        assert!(p.to_distribution().is_err());
    }

    #[test]
    fn test_log_moments() {
        let e = std::f64::consts::E;
        let m = LogMoments::from_terminal_prices(arr1(&[1.0, e, e * e]).view()).unwrap();
        assert_relative_eq!(m.mean_ln, 1.0, epsilon = 1e-12);
        assert_relative_eq!(m.std_ln, 1.0, epsilon = 1e-12);
        assert_eq!(m.samples, 3);
    }

    #[test]
    fn test_point_mass_comparisons_are_finite() {
        let params = LognormalParams { mu_ln: 4.6, sigma_ln: 0.0 };
        let exact = LogMoments { mean_ln: 4.6, std_ln: 0.0, samples: 10 };
        assert_eq!(exact.mean_z_score(&params), 0.0);
        assert_eq!(exact.std_relative_error(&params), 0.0);

        let above = LogMoments { mean_ln: 4.7, std_ln: 0.01, samples: 10 };
        assert_eq!(above.mean_z_score(&params), f64::INFINITY);
        assert_relative_eq!(above.std_relative_error(&params), 0.01);

        let below = LogMoments { mean_ln: 4.5, ..above };
        assert_eq!(below.mean_z_score(&params), f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_moments_rejects_bad_prices() {
        assert!(LogMoments::from_terminal_prices(arr1(&[1.0, 0.0]).view()).is_err());
        assert!(LogMoments::from_terminal_prices(arr1(&[f64::NAN]).view()).is_err());
        let empty = ndarray::Array1::<f64>::zeros(0);
        assert!(LogMoments::from_terminal_prices(empty.view()).unwrap_err().is_configuration());
    }
}
