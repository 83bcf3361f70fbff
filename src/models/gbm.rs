// src/models/gbm.rs
//! Risk-neutral Geometric Brownian Motion.
//!
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! S_{t+dt} = S_t * exp((r - σ²/2) dt + σ √dt Z),   Z ~ N(0,1)
//! ```
//!
//! The drift is the risk-free rate because pricing happens under the
//! risk-neutral measure; the `-σ²/2` term makes `E[S_t] = S_0 e^{rt}` hold.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gbm {
    pub s0: f64,
    pub r: f64,
    pub sigma: f64,
}

/// Per-step constants of the exact GBM update for a fixed `dt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GbmStep {
    pub drift_dt: f64,
    pub vol_sqrt_dt: f64,
}

impl GbmStep {
    #[inline]
    pub fn advance(&self, s_prev: f64, normal_draw: f64) -> f64 {
        s_prev * (self.drift_dt + self.vol_sqrt_dt * normal_draw).exp()
    }
}

impl Gbm {
    pub fn new(s0: f64, r: f64, sigma: f64) -> Self {
        Gbm { s0, r, sigma }
    }

    pub fn step_coefficients(&self, dt: f64) -> GbmStep {
        GbmStep {
            drift_dt: (self.r - 0.5 * self.sigma * self.sigma) * dt,
            vol_sqrt_dt: self.sigma * dt.sqrt(),
        }
    }

    pub fn exact_step(&self, s_t: f64, dt: f64, normal_draw: f64) -> f64 {
        self.step_coefficients(dt).advance(s_t, normal_draw)
    }

    /// `E[S_t] = S_0 e^{rt}`
    pub fn expected_price(&self, t: f64) -> f64 {
        self.s0 * (self.r * t).exp()
    }
}
