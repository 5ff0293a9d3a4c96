//! Measurement sets: synthetic generation and assembly from raw arrays.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::domain::{SampleConfig, Samples, broadcast};
use crate::error::AppError;

/// Generate a noisy straight-line data set.
///
/// `x` is an evenly spaced grid over `[x_min, x_max]` jittered by
/// `noise · N(0, 1)`, and `y = slope · x + noise · N(0, 1)`. Every sample gets
/// the same uncertainties `sigma_x` / `sigma_y`. The RNG is seeded, so a given
/// config always yields the same data.
pub fn generate_sample(config: &SampleConfig) -> Result<Samples, AppError> {
    if config.points < 2 {
        return Err(AppError::usage("Synthetic data needs at least 2 points."));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::usage("Invalid x range for synthetic data."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::usage("Noise level must be finite and non-negative."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0).map_err(|e| AppError::data(format!("Noise distribution error: {e}")))?;

    let n = config.points;
    let x: Vec<f64> = linspace(config.x_min, config.x_max, n)
        .into_iter()
        .map(|v| v + config.noise * normal.sample(&mut rng))
        .collect();
    let y: Vec<f64> = x
        .iter()
        .map(|&v| config.slope * v + config.noise * normal.sample(&mut rng))
        .collect();

    debug!(points = n, seed = config.seed, "generated synthetic sample");

    Samples::new(x, y, vec![config.sigma_x; n], vec![config.sigma_y; n])
}

/// Assemble a measurement set from command-line arrays.
///
/// `dx` / `dy` may hold a single value that applies to every sample.
pub fn samples_from_arrays(x: &[f64], y: &[f64], dx: &[f64], dy: &[f64]) -> Result<Samples, AppError> {
    if dx.is_empty() || dy.is_empty() {
        return Err(AppError::data("Uncertainties dx and dy are required with measured data."));
    }
    let n = x.len();
    Samples::new(x.to_vec(), y.to_vec(), broadcast(dx, n), broadcast(dy, n))
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| {
                let u = i as f64 / (n as f64 - 1.0);
                start + u * (end - start)
            })
            .collect(),
    }
}
