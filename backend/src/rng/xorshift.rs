//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Algorithm
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers, and therefore the same
//! conversions, cascades and deflections for a given set of tracks.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use material_effects_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let u = rng.flat(0.0, 1.0);
/// let g = rng.gaussian(0.0, 1.0);
/// assert!(u >= 0.0 && u < 1.0);
/// assert!(g.is_finite());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// # Arguments
    /// * `seed` - Initial seed value (u64)
    pub fn new(seed: u64) -> Self {
        // Ensure seed is never zero (xorshift requirement)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    ///
    /// This advances the internal state and returns a random value.
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Get current RNG state (for checkpointing/replay)
    ///
    /// # Example
    /// ```
    /// use material_effects_core_rs::RngManager;
    ///
    /// let rng = RngManager::new(12345);
    /// let state = rng.get_state();
    ///
    /// // Later, can recreate RNG from this state
    /// let rng2 = RngManager::new(state);
    /// ```
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) by dividing by 2^53
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform value in `[min, max)`
    pub fn flat(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    /// Normally distributed value (Box-Muller, one draw kept)
    pub fn gaussian(&mut self, mean: f64, sigma: f64) -> f64 {
        // 1 - u lies in (0, 1], keeping the logarithm finite
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let radius = (-2.0 * u1.ln()).sqrt();
        mean + sigma * radius * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Exponentially distributed value with the given mean
    pub fn exponential(&mut self, mean: f64) -> f64 {
        -mean * (1.0 - self.next_f64()).ln()
    }

    /// Poisson-distributed count
    ///
    /// Knuth's multiplication method below a mean of 30, rounded normal
    /// approximation above. Non-positive means return 0.
    pub fn poisson(&mut self, mean: f64) -> u32 {
        if mean.is_nan() || mean <= 0.0 {
            return 0;
        }

        if mean > 30.0 {
            let draw = self.gaussian(mean, mean.sqrt()).round();
            return if draw < 0.0 { 0 } else { draw as u32 };
        }

        let limit = (-mean).exp();
        let mut count = 0;
        let mut product = self.next_f64();
        while product > limit {
            count += 1;
            product *= self.next_f64();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = RngManager::new(0);
        assert_ne!(rng.get_state(), 0, "Zero seed should be converted to 1");
    }

    #[test]
    fn test_next_f64_in_range() {
        let mut rng = RngManager::new(12345);

        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!(
                val >= 0.0 && val < 1.0,
                "next_f64() produced value {} outside [0.0, 1.0)",
                val
            );
        }
    }

    #[test]
    fn test_flat_respects_bounds() {
        let mut rng = RngManager::new(7);
        for _ in 0..1000 {
            let val = rng.flat(-2.0, 3.0);
            assert!((-2.0..3.0).contains(&val));
        }
    }

    #[test]
    fn test_exponential_is_non_negative() {
        let mut rng = RngManager::new(99);
        for _ in 0..1000 {
            assert!(rng.exponential(1.0) >= 0.0);
        }
    }

    #[test]
    fn test_poisson_zero_mean() {
        let mut rng = RngManager::new(5);
        assert_eq!(rng.poisson(0.0), 0);
        assert_eq!(rng.poisson(-1.0), 0);
        assert_eq!(rng.poisson(f64::NAN), 0);
    }

    #[test]
    fn test_poisson_sample_mean() {
        let mut rng = RngManager::new(2024);
        let n = 20_000;
        let total: u64 = (0..n).map(|_| rng.poisson(2.5) as u64).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 2.5).abs() < 0.1, "sample mean {}", mean);
    }

    #[test]
    fn test_gaussian_sample_moments() {
        let mut rng = RngManager::new(31337);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| rng.gaussian(1.0, 2.0)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 1.0).abs() < 0.1, "mean {}", mean);
        assert!((var.sqrt() - 2.0).abs() < 0.1, "sigma {}", var.sqrt());
    }
}
