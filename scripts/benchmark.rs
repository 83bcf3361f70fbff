// scripts/benchmark.rs
use gbm_mc::analytics::bs_analytic;
use gbm_mc::math_utils::Timer;
use gbm_mc::mc::mc_engine::{run_simulation, SimulationConfig};
use gbm_mc::{SdeError, SdeResult};
use std::process::Command;
use std::{env, fs};

/// Host description printed above the results table.
#[derive(Debug)]
struct SystemInfo {
    os: &'static str,
    cpu_model: String,
    cpu_cores: usize,
    memory_gb: Option<f64>,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        let cpuinfo = fs::read_to_string("/proc/cpuinfo").unwrap_or_default();
        let meminfo = fs::read_to_string("/proc/meminfo").unwrap_or_default();
        let rust_version = Command::new("rustc")
            .arg("--version")
            .output()
            .ok()
            .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            os: env::consts::OS,
            cpu_model: colon_field(&cpuinfo, "model name").unwrap_or_else(|| "unknown".to_string()),
            cpu_cores: num_cpus::get(),
            memory_gb: total_memory_gb(&meminfo),
            rust_version: rust_version.unwrap_or_else(|| "unknown".to_string()),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }
}

/// Value of the first `key: value` line in a `/proc`-style listing.
fn colon_field(listing: &str, key: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        (k.trim() == key).then(|| v.trim().to_string())
    })
}

/// `MemTotal` from `/proc/meminfo`, in GiB.
fn total_memory_gb(meminfo: &str) -> Option<f64> {
    let kb: u64 = colon_field(meminfo, "MemTotal")?
        .split_whitespace()
        .next()?
        .parse()
        .ok()?;
    Some(kb as f64 / (1024.0 * 1024.0))
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    paths: usize,
    threads: usize,
    time_ms: f64,
    throughput_paths_per_sec: f64,
    value: f64,
    std_error: f64,
    relative_error: f64,
}

fn bench_config(paths: usize) -> SimulationConfig {
    SimulationConfig {
        paths,
        ..Default::default()
    }
}

fn time_run(name: String, cfg: &SimulationConfig, threads: usize) -> SdeResult<BenchmarkResult> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| SdeError::InvalidConfiguration {
            field: "threads".to_string(),
            reason: e.to_string(),
        })?;

    let timer = Timer::new();
    let result = pool.install(|| run_simulation(cfg, Some(42)))?;
    let time_ms = timer.elapsed_ms();

    let analytic = bs_analytic::bs_call_price(cfg.s0, cfg.k, cfg.r, cfg.sigma, cfg.t);
    Ok(BenchmarkResult {
        name,
        paths: cfg.paths,
        threads,
        time_ms,
        throughput_paths_per_sec: cfg.paths as f64 / (time_ms / 1000.0),
        value: result.estimate.price,
        std_error: result.estimate.std_error,
        relative_error: (result.estimate.price - analytic).abs() / analytic,
    })
}

fn run_path_scaling(threads: usize) -> SdeResult<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    for &paths in &[10_000, 100_000, 1_000_000] {
        println!("Running {} paths on {} threads...", paths, threads);
        results.push(time_run(
            format!("European Call ({}k paths)", paths / 1000),
            &bench_config(paths),
            threads,
        )?);
    }
    Ok(results)
}

fn run_thread_scaling(max_threads: usize) -> SdeResult<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    let cfg = bench_config(200_000);
    let mut threads = 1;
    while threads <= max_threads {
        println!("Running {} paths on {} threads...", cfg.paths, threads);
        results.push(time_run(format!("Thread scaling ({} threads)", threads), &cfg, threads)?);
        threads *= 2;
    }
    Ok(results)
}

fn main() -> SdeResult<()> {
    println!("gbm-mc Benchmark Suite");
    println!("======================\n");

    let system_info = SystemInfo::gather();

    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    match system_info.memory_gb {
        Some(gb) => println!("  Memory: {:.1} GB", gb),
        None => println!("  Memory: unknown"),
    }
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!(
        "  Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    let mut all_results = run_path_scaling(system_info.rayon_threads)?;
    all_results.extend(run_thread_scaling(system_info.cpu_cores)?);

    println!("\n{:=<100}", "");
    println!("BENCHMARK RESULTS (S0=100, K=110, r=5%, sigma=20%, T=1, 252 steps)");
    println!("{:=<100}", "");
    println!(
        "{:<32} {:>9} {:>8} {:>12} {:>14} {:>9} {:>10} {:>10}",
        "Benchmark", "Paths", "Threads", "Time (ms)", "Paths/sec", "Price", "Std Err", "Rel Error"
    );
    println!("{:-<100}", "");

    for result in &all_results {
        println!(
            "{:<32} {:>9} {:>8} {:>12.2} {:>14.0} {:>9.4} {:>10.6} {:>9.3}%",
            result.name,
            result.paths,
            result.threads,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.value,
            result.std_error,
            result.relative_error * 100.0
        );
    }

    println!("{:=<100}", "");
    println!("\nTo reproduce these results:");
    println!("1. Use Rust version: {}", system_info.rust_version);
    println!("2. Set RUSTFLAGS: {}", system_info.rustc_flags);
    println!("3. Run: cargo run --bin benchmark --release");

    Ok(())
}
