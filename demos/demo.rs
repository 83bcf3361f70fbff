// demos/demo.rs
use gbm_mc::analytics::bs_analytic;
use gbm_mc::analytics::lognormal::LogMoments;
use gbm_mc::mc::mc_engine::{run_simulation, SimulationConfig};
use gbm_mc::SdeResult;
use statrs::distribution::Continuous;

const HISTOGRAM_BINS: usize = 25;

fn main() -> SdeResult<()> {
    println!("Running gbm-mc Monte Carlo Demo\n");

    let cfg = SimulationConfig {
        paths: 200_000,
        ..Default::default()
    };
    let result = run_simulation(&cfg, Some(42))?;
    let analytic = bs_analytic::bs_call_price(cfg.s0, cfg.k, cfg.r, cfg.sigma, cfg.t);

    println!("Monte Carlo estimated call option price: {:.4}", result.estimate.price);
    println!("Black-Scholes price:                     {:.4}", analytic);
    println!(
        "Simulation completed in {:.4} seconds.\n",
        result.elapsed.as_secs_f64()
    );

    // Sample paths, as a plotting collaborator would receive them.
    println!("Sample simulated paths (every 63rd step):");
    for (i, path) in result.sample_paths.outer_iter().take(10).enumerate() {
        let points: Vec<String> = path
            .iter()
            .step_by(63)
            .map(|s| format!("{:8.2}", s))
            .collect();
        println!("  path {:2}: {}", i, points.join(" "));
    }

    // Terminal-price histogram against the theoretical log-normal density.
    let density = result.lognormal.to_distribution()?;
    let (lo, hi) = (0.5 * cfg.s0, 2.5 * cfg.s0);
    let width = (hi - lo) / HISTOGRAM_BINS as f64;
    let mut counts = [0usize; HISTOGRAM_BINS];
    for &s_t in result.terminal_prices.iter() {
        if s_t >= lo && s_t < hi {
            counts[(((s_t - lo) / width) as usize).min(HISTOGRAM_BINS - 1)] += 1;
        }
    }

    println!("\nDistribution of final prices vs log-normal pdf:");
    println!("  {:>8}  {:>10}  {:>10}", "S_T", "simulated", "theory");
    let n = result.terminal_prices.len() as f64;
    for (b, &count) in counts.iter().enumerate() {
        let mid = lo + (b as f64 + 0.5) * width;
        let simulated = count as f64 / (n * width);
        let bar = "#".repeat((simulated * 4000.0).round() as usize);
        println!(
            "  {:8.1}  {:10.6}  {:10.6}  {}",
            mid,
            simulated,
            density.pdf(mid),
            bar
        );
    }

    let moments = LogMoments::from_terminal_prices(result.terminal_prices.view())?;
    println!(
        "\nmu_ln = {:.4} (simulated {:.4}), sigma_ln = {:.4} (simulated {:.4})",
        result.lognormal.mu_ln, moments.mean_ln, result.lognormal.sigma_ln, moments.std_ln
    );

    Ok(())
}
