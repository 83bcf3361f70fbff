// src/rng.rs
//! Random Driver Generation for Monte Carlo Simulations
//!
//! # Design Philosophy
//!
//! The innovation table must satisfy:
//! 1. **Reproducibility**: Same seed → same table (critical for debugging/validation)
//! 2. **Parallel safety**: Different threads must have independent streams
//! 3. **Schedule independence**: a path's draws must not depend on how rows
//!    are split into blocks or across threads
//!
//! # Counter-Based Seeding
//!
//! Every path row owns a generator seeded from `(base_seed, path_index)`:
//! - Deterministic mapping: (seed, path) → row of draws
//! - Identical results for any thread count or block size
//! - The pair is hashed through a splitmix64 finaliser, so runs with
//!   neighbouring base seeds share no rows
//!
//! Draws come from `rand_distr::StandardNormal` on top of `StdRng`.

use crate::error::{validation, SdeResult};
use crate::math_utils::try_alloc_matrix;
use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayViewMut2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use tracing::debug;

/// `paths x steps` table of independent standard-normal draws, column-major.
pub type InnovationMatrix = Array2<f64>;

/// RNG factory for reproducible parallel simulations
#[derive(Debug, Clone, Copy)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Factory with a base seed drawn from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().gen())
    }

    /// Seeded when `seed` is given, nondeterministic otherwise.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Create a standard RNG for a specific path
    pub fn create_std_rng(&self, path_id: u64) -> StdRng {
        StdRng::seed_from_u64(path_seed(self.base_seed, path_id))
    }
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed of path `path_id` under `base_seed`.
pub fn path_seed(base_seed: u64, path_id: u64) -> u64 {
    let mut z = base_seed ^ path_id.wrapping_mul(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Fill `block` with standard-normal draws, row `i` being global path
/// `first_path + i`.
pub fn fill_innovations(factory: &RngFactory, first_path: usize, mut block: ArrayViewMut2<'_, f64>) {
    block
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(i, mut row)| {
            let mut rng = factory.create_std_rng((first_path + i) as u64);
            for z in row.iter_mut() {
                *z = get_normal_draw(&mut rng);
            }
        });
}

/// Allocate and fill the innovations for paths `first_path..first_path + rows`.
pub fn innovation_block(
    factory: &RngFactory,
    first_path: usize,
    rows: usize,
    steps: usize,
) -> SdeResult<InnovationMatrix> {
    let mut block = try_alloc_matrix("innovation matrix", rows, steps)?;
    fill_innovations(factory, first_path, block.view_mut());
    debug!(first_path, rows, steps, "generated innovation block");
    Ok(block)
}

/// Generate a full `paths x steps` innovation table.
///
/// With `Some(seed)` the table is reproducible; with `None` the base seed is
/// drawn from entropy.
///
/// # Errors
///
/// - `InvalidConfiguration` for zero or oversized `paths`/`steps`
/// - `ResourceExhausted` if the table cannot be allocated
pub fn generate_innovations(
    paths: usize,
    steps: usize,
    seed: Option<u64>,
) -> SdeResult<InnovationMatrix> {
    validation::validate_paths(paths)?;
    validation::validate_steps(steps)?;
    innovation_block(&RngFactory::from_optional_seed(seed), 0, paths, steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::s;

    #[test]
    fn test_seeded_reproducibility() {
        let a = generate_innovations(64, 16, Some(42)).unwrap();
        let b = generate_innovations(64, 16, Some(42)).unwrap();
        assert_eq!(a.dim(), (64, 16));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_innovations(8, 8, Some(1)).unwrap();
        let b = generate_innovations(8, 8, Some(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_neighbouring_seeds_share_no_rows() {
        let a = generate_innovations(64, 8, Some(1)).unwrap();
        let b = generate_innovations(64, 8, Some(2)).unwrap();
        for i in 0..64 {
            for j in 0..64 {
                assert_ne!(a.row(i), b.row(j), "seed 1 row {} equals seed 2 row {}", i, j);
            }
        }
    }

    #[test]
    fn test_path_seeds_are_mixed() {
        assert_ne!(path_seed(1, 1), path_seed(2, 0));
        assert_ne!(path_seed(0, 0), path_seed(0, 1));
        assert_eq!(path_seed(42, 7), path_seed(42, 7));
    }

    #[test]
    fn test_unseeded_mode() {
        let a = generate_innovations(16, 16, None).unwrap();
        let b = generate_innovations(16, 16, None).unwrap();
        assert!(a.iter().all(|z| z.is_finite()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_rows_are_distinct_streams() {
        let z = generate_innovations(2, 32, Some(7)).unwrap();
        assert_ne!(z.row(0), z.row(1));
    }

    #[test]
    fn test_block_matches_full_table() {
        let factory = RngFactory::new(99);
        let full = innovation_block(&factory, 0, 100, 12).unwrap();
        let block = innovation_block(&factory, 40, 25, 12).unwrap();
        assert_eq!(full.slice(s![40..65, ..]), block);
    }

    #[test]
    fn test_normal_distribution() {
        let z = generate_innovations(2_000, 50, Some(42)).unwrap();
        let n = z.len() as f64;

        let mean = z.sum() / n;
        let variance = z.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        assert!(mean.abs() < 0.01, "Mean should be close to 0, got {}", mean);
        assert!((variance - 1.0).abs() < 0.02, "Variance should be close to 1, got {}", variance);
    }

    #[test]
    fn test_invalid_shapes() {
        let err = generate_innovations(0, 10, Some(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        let err = generate_innovations(10, 0, Some(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_oversized_block_is_resource_error() {
        let err = innovation_block(&RngFactory::new(1), 0, usize::MAX / 2, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
    }
}
