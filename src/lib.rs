//! # gbm-mc: Monte Carlo Pricing under Geometric Brownian Motion
//!
//! Prices a European call by simulating risk-neutral GBM paths on a discrete
//! time grid, and exposes the log-normal law of the terminal price so the
//! simulated distribution can be checked against theory.
//!
//! ## Pipeline
//!
//! - **Random drivers** ([`rng`]): `paths x steps` standard-normal table,
//!   seeded per path for reproducibility
//! - **Propagation** ([`mc::paths`]): one data-parallel stage per time step
//! - **Evaluation** ([`mc::payoffs`]): payoff, discounting, mean and
//!   standard error
//! - **Distribution summary** ([`analytics::lognormal`]): `(μ_ln, σ_ln)` of `S_T`
//!
//! ## Quick Start
//!
//! ```rust
//! use gbm_mc::mc::mc_engine::{run_simulation, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     paths: 10_000,
//!     steps: 52,
//!     s0: 100.0,      // Spot price
//!     k: 110.0,       // Strike
//!     r: 0.05,        // Risk-free rate
//!     sigma: 0.2,     // Volatility
//!     t: 1.0,         // Time to expiration
//!     ..Default::default()
//! };
//!
//! let result = run_simulation(&config, Some(42)).expect("Valid configuration");
//! let (lo, hi) = result.estimate.confidence_interval(1.96);
//! println!("Call price: {:.4} in [{:.4}, {:.4}]", result.estimate.price, lo, hi);
//! ```

pub mod analytics;
pub mod error;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod rng;

// Re-export commonly used types for convenience
pub use analytics::lognormal::LognormalParams;
pub use error::{ErrorKind, SdeError, SdeResult};
pub use mc::mc_engine::{run_simulation, simulate_paths, SimulationConfig, SimulationResult};
pub use mc::paths::PathTensor;
pub use mc::payoffs::PriceEstimate;
pub use rng::InnovationMatrix;
