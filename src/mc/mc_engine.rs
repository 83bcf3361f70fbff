// src/mc/mc_engine.rs
//! Monte Carlo engine: run configuration, the batched simulation driver and
//! its result bundle.
//!
//! [`run_simulation`] chains the random driver, the path propagator and the
//! payoff evaluator block by block; [`simulate_paths`] materialises one full
//! tensor for small runs.

use crate::analytics::lognormal::LognormalParams;
use crate::error::{validation::*, SdeError, SdeResult};
use crate::math_utils::Timer;
use crate::mc::paths::{self, PathTensor};
use crate::mc::payoffs::{self, PriceEstimate};
use crate::models::gbm::Gbm;
use crate::rng::{self, RngFactory};
use ndarray::{Array1, Axis};
use std::time::Duration;
use tracing::{debug, info, info_span};

/// Default number of paths simulated per block by [`run_simulation`].
pub const DEFAULT_BATCH_PATHS: usize = 32_768;

/// Upper bound on the entries of one block's path tensor (256 MiB of `f64`).
pub const MAX_BLOCK_ELEMENTS: usize = 1 << 25;

/// Parameters of one simulation run.
///
/// Model parameters plus two engine knobs: `batch_paths` bounds peak memory
/// and `sample_paths` sets how many leading paths are exported for plotting.
/// Neither knob changes any simulated value.
///
/// `batch_paths` is an upper bound: a block never holds more than
/// [`MAX_BLOCK_ELEMENTS`] tensor entries, so long horizons get fewer rows
/// per block (see [`SimulationConfig::block_rows`]).
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub paths: usize,
    pub steps: usize,
    pub s0: f64,
    pub k: f64,
    pub r: f64,
    pub sigma: f64,
    pub t: f64,
    pub batch_paths: usize,
    pub sample_paths: usize,
}

impl SimulationConfig {
    /// Validate the simulation configuration
    pub fn validate(&self) -> SdeResult<()> {
        validate_paths(self.paths)?;
        validate_steps(self.steps)?;
        validate_positive("s0", self.s0)?;
        validate_positive("k", self.k)?;
        validate_finite("r", self.r)?;
        validate_non_negative("sigma", self.sigma)?;
        validate_positive("t", self.t)?;
        validate_non_zero("batch_paths", self.batch_paths)?;

        let dt = self.dt();
        if dt <= 0.0 || !dt.is_finite() {
            return Err(SdeError::InvalidConfiguration {
                field: "steps".to_string(),
                reason: format!("time step t / steps is {}", dt),
            });
        }

        Ok(())
    }

    /// Rows simulated per block: `batch_paths`, capped so a block's tensor
    /// stays within [`MAX_BLOCK_ELEMENTS`], and never below one row.
    pub fn block_rows(&self) -> usize {
        let by_memory = MAX_BLOCK_ELEMENTS / (self.steps + 1);
        self.batch_paths.min(by_memory).max(1)
    }

    pub fn dt(&self) -> f64 {
        self.t / self.steps as f64
    }

    pub fn discount_factor(&self) -> f64 {
        (-self.r * self.t).exp()
    }

    pub fn model(&self) -> Gbm {
        Gbm::new(self.s0, self.r, self.sigma)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            paths: 1_000_000,
            steps: 252,
            s0: 100.0,
            k: 110.0,
            r: 0.05,
            sigma: 0.2,
            t: 1.0,
            batch_paths: DEFAULT_BATCH_PATHS,
            sample_paths: 100,
        }
    }
}

/// Everything a completed run hands to its collaborators.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub estimate: PriceEstimate,
    /// `S_T` of every path, in path order.
    pub terminal_prices: Array1<f64>,
    pub lognormal: LognormalParams,
    /// Full paths of the first `sample_paths` rows.
    pub sample_paths: PathTensor,
    /// Base seed actually used; replaying it reproduces the run.
    pub seed: u64,
    pub elapsed: Duration,
}

/// Monte Carlo price of a European call under risk-neutral GBM
///
/// # Math Framework
///
/// Simulates the GBM SDE:
/// ```text
/// dS_t = r S_t dt + σ S_t dW_t
/// ```
///
/// one step at a time with the exact update
/// ```text
/// S_{t+dt} = S_t * exp((r - σ²/2)dt + σ√dt * Z)
/// ```
/// and returns `e^{-rT} * mean(max(S_T - K, 0))` with its standard error.
///
/// # Execution
///
/// Paths are processed in blocks of [`SimulationConfig::block_rows`] rows.
/// Each block draws its innovations, propagates its tensor, and keeps only
/// the terminal column (plus the exported sample rows) before the next block
/// is allocated. Every
/// path is seeded from `(seed, path_index)`, so the result is the same for
/// any block size or thread count.
///
/// # Errors
///
/// Returns `SdeError` for:
/// - Invalid configuration parameters (before any allocation)
/// - Allocation failure for a block or the terminal-price buffer
/// - Non-positive or non-finite prices
pub fn run_simulation(cfg: &SimulationConfig, seed: Option<u64>) -> SdeResult<SimulationResult> {
    cfg.validate()?;
    let timer = Timer::new();
    let factory = RngFactory::from_optional_seed(seed);
    let _span = info_span!(
        "run_simulation",
        paths = cfg.paths,
        steps = cfg.steps,
        seed = factory.base_seed()
    )
    .entered();

    let mut terminal: Vec<f64> = Vec::new();
    terminal
        .try_reserve_exact(cfg.paths)
        .map_err(|_| SdeError::ResourceExhausted {
            what: "terminal prices".to_string(),
            rows: cfg.paths,
            cols: 1,
        })?;

    let mut samples: Vec<PathTensor> = Vec::new();
    let mut sampled = 0;
    let mut first_path = 0;
    let block_rows = cfg.block_rows();
    while first_path < cfg.paths {
        let rows = block_rows.min(cfg.paths - first_path);
        let innovations = rng::innovation_block(&factory, first_path, rows, cfg.steps)?;
        let block = paths::propagate_block(cfg, first_path, innovations)?;

        terminal.extend(block.column(cfg.steps).iter().copied());
        if sampled < cfg.sample_paths {
            let head = paths::export_rows(&block, cfg.sample_paths - sampled);
            sampled += head.nrows();
            samples.push(head);
        }
        debug!(first_path, rows, "propagated block");
        first_path += rows;
    }

    let terminal_prices = Array1::from_vec(terminal);
    let estimate = payoffs::evaluate_terminal(terminal_prices.view(), cfg)?;
    let lognormal = LognormalParams::from_config(cfg);
    let sample_paths = stack_rows(&samples, cfg.steps + 1)?;
    let elapsed = timer.elapsed();

    info!(
        price = estimate.price,
        std_error = estimate.std_error,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "simulation complete"
    );

    Ok(SimulationResult {
        estimate,
        terminal_prices,
        lognormal,
        sample_paths,
        seed: factory.base_seed(),
        elapsed,
    })
}

/// Materialize the full `paths x (steps + 1)` tensor of a run in one block.
///
/// Row `i` equals row `i` of any [`run_simulation`] call with the same seed.
/// Memory grows with `paths * steps`; use it for small runs and plotting.
pub fn simulate_paths(cfg: &SimulationConfig, seed: Option<u64>) -> SdeResult<PathTensor> {
    cfg.validate()?;
    let innovations = rng::generate_innovations(cfg.paths, cfg.steps, seed)?;
    paths::propagate(cfg, innovations)
}

fn stack_rows(blocks: &[PathTensor], cols: usize) -> SdeResult<PathTensor> {
    if blocks.is_empty() {
        return Ok(PathTensor::zeros((0, cols)));
    }
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    ndarray::concatenate(Axis(0), &views).map_err(|e| SdeError::InvalidConfiguration {
        field: "sample_paths".to_string(),
        reason: e.to_string(),
    })
}

/// Terminal column of a populated tensor as a view.
pub fn terminal_prices(paths: &PathTensor) -> ndarray::ArrayView1<'_, f64> {
    paths.index_axis(Axis(1), paths.ncols().saturating_sub(1))
}
