//! mc-price: price a European call by Monte Carlo simulation of GBM.
//!
//! Every simulation parameter is a flag; defaults reproduce the reference
//! run (S0=100, K=110, r=5%, σ=20%, T=1, 252 steps, 1M paths).
//!
//! Logging goes through `tracing`; set `RUST_LOG=gbm_mc=debug` to see
//! per-block progress.

use clap::Parser;
use gbm_mc::analytics::bs_analytic;
use gbm_mc::analytics::lognormal::LogMoments;
use gbm_mc::mc::mc_engine::{run_simulation, SimulationConfig, DEFAULT_BATCH_PATHS};
use gbm_mc::SdeResult;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Monte Carlo European call pricer under risk-neutral GBM
#[derive(Parser, Debug)]
#[command(name = "mc-price")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Initial asset price S0
    #[arg(long, default_value_t = 100.0)]
    s0: f64,

    /// Strike price K
    #[arg(short = 'k', long, default_value_t = 110.0)]
    strike: f64,

    /// Risk-free rate r (annualised, continuous compounding)
    #[arg(short, long, default_value_t = 0.05)]
    rate: f64,

    /// Volatility sigma (annualised)
    #[arg(long, default_value_t = 0.2)]
    sigma: f64,

    /// Time to maturity T in years
    #[arg(short = 't', long, default_value_t = 1.0)]
    maturity: f64,

    /// Number of time steps
    #[arg(long, default_value_t = 252)]
    steps: usize,

    /// Number of simulated paths N
    #[arg(short = 'n', long, default_value_t = 1_000_000)]
    paths: usize,

    /// Seed for reproducible runs; omitted means nondeterministic
    #[arg(long)]
    seed: Option<u64>,

    /// Paths simulated per block (bounds memory, does not change results)
    #[arg(long, default_value_t = DEFAULT_BATCH_PATHS)]
    batch_paths: usize,

    /// Leading paths kept for plotting
    #[arg(long, default_value_t = 100)]
    sample_paths: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            paths: self.paths,
            steps: self.steps,
            s0: self.s0,
            k: self.strike,
            r: self.rate,
            sigma: self.sigma,
            t: self.maturity,
            batch_paths: self.batch_paths,
            sample_paths: self.sample_paths,
        }
    }
}

fn main() -> SdeResult<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let cfg = cli.config();
    info!(?cfg, seed = ?cli.seed, "starting simulation");

    let result = run_simulation(&cfg, cli.seed)?;
    let estimate = &result.estimate;
    let (lo, hi) = estimate.confidence_interval(1.96);
    let analytic = bs_analytic::bs_call_price(cfg.s0, cfg.k, cfg.r, cfg.sigma, cfg.t);
    let moments = LogMoments::from_terminal_prices(result.terminal_prices.view())?;

    println!("Monte Carlo estimated call option price: {:.4}", estimate.price);
    println!("  standard error:          {:.6}", estimate.std_error);
    println!("  95% confidence interval: [{:.4}, {:.4}]", lo, hi);
    println!("  Black-Scholes price:     {:.4}", analytic);
    println!("  z-score vs analytic:     {:.2}", estimate.z_score(analytic));
    println!();
    println!("Terminal price distribution (ln S_T):");
    println!(
        "  mu_ln:    theory {:.6}  simulated {:.6}",
        result.lognormal.mu_ln, moments.mean_ln
    );
    println!(
        "  sigma_ln: theory {:.6}  simulated {:.6}",
        result.lognormal.sigma_ln, moments.std_ln
    );
    println!();
    println!(
        "Simulation of {} paths x {} steps completed in {:.4} seconds (seed {}, {} rayon threads).",
        cfg.paths,
        cfg.steps,
        result.elapsed.as_secs_f64(),
        result.seed,
        rayon::current_num_threads()
    );

    Ok(())
}
