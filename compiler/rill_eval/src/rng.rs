//! The interpreter's random generator.
//!
//! One generator per interpreter, seeded explicitly (`setSeed`, config) or
//! from the clock and process id. Distribution draws are built on uniform
//! draws from `StdRng`:
//!
//! - normal: Marsaglia polar method, caching the second deviate
//! - exponential: inverse CDF
//! - Poisson: multiplication for small means, PTRS (Hörmann) for `lambda >= 30`
//! - binomial: geometric waiting times, reflected for `p > 0.5`

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Mean at which Poisson sampling switches to transformed rejection.
const POISSON_PTRS_THRESHOLD: f64 = 30.0;

/// Seed derived from the wall clock and the process id.
pub fn generate_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    #[allow(
        clippy::cast_possible_truncation,
        reason = "only the low bits of the clock are wanted"
    )]
    let low = nanos as u64;
    low ^ (u64::from(std::process::id()) << 32)
}

/// Seeded generator with the distributions the builtins need.
#[derive(Debug)]
pub struct ScriptRng {
    rng: StdRng,
    seed: u64,
    spare_normal: Option<f64>,
}

impl ScriptRng {
    pub fn new(seed: u64) -> Self {
        ScriptRng {
            rng: StdRng::seed_from_u64(seed),
            seed,
            spare_normal: None,
        }
    }

    /// The seed last used to (re)initialize the generator.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        tracing::debug!(seed, "reseeding random generator");
        *self = ScriptRng::new(seed);
    }

    /// Uniform on `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// Uniform on `(0, 1]`; safe to take the logarithm of.
    #[inline]
    fn uniform_positive(&mut self) -> f64 {
        1.0 - self.uniform()
    }

    /// Uniform index in `0..bound`; `bound` must be positive.
    #[inline]
    pub fn index_below(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }

    pub fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        if let Some(spare) = self.spare_normal.take() {
            return mean + sd * spare;
        }
        loop {
            let u = 2.0 * self.uniform() - 1.0;
            let v = 2.0 * self.uniform() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let scale = (-2.0 * s.ln() / s).sqrt();
                self.spare_normal = Some(v * scale);
                return mean + sd * u * scale;
            }
        }
    }

    pub fn exponential(&mut self, rate: f64) -> f64 {
        -self.uniform_positive().ln() / rate
    }

    pub fn poisson(&mut self, lambda: f64) -> i64 {
        if lambda < POISSON_PTRS_THRESHOLD {
            self.poisson_multiplication(lambda)
        } else {
            self.poisson_ptrs(lambda)
        }
    }

    fn poisson_multiplication(&mut self, lambda: f64) -> i64 {
        let limit = (-lambda).exp();
        let mut count = 0;
        let mut product = self.uniform();
        while product > limit {
            count += 1;
            product *= self.uniform();
        }
        count
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "k is a floored, bounded deviate"
    )]
    fn poisson_ptrs(&mut self, lambda: f64) -> i64 {
        let slam = lambda.sqrt();
        let loglam = lambda.ln();
        let b = 0.931 + 2.53 * slam;
        let a = -0.059 + 0.024_83 * b;
        let inv_alpha = 1.123_9 + 1.132_8 / (b - 3.4);
        let vr = 0.927_7 - 3.622_4 / (b - 2.0);

        loop {
            let u = self.uniform() - 0.5;
            let v = self.uniform();
            let us = 0.5 - u.abs();
            let k = ((2.0 * a / us + b) * u + lambda + 0.43).floor();
            if us >= 0.07 && v <= vr {
                return k as i64;
            }
            if k < 0.0 || (us < 0.013 && v > us) {
                continue;
            }
            let accept = (v * inv_alpha / (a / (us * us) + b)).ln();
            if accept <= -lambda + k * loglam - ln_factorial(k) {
                return k as i64;
            }
        }
    }

    pub fn binomial(&mut self, trials: i64, prob: f64) -> i64 {
        if prob > 0.5 {
            return trials - self.binomial(trials, 1.0 - prob);
        }
        if prob <= 0.0 || trials <= 0 {
            return 0;
        }
        let log_q = (1.0 - prob).ln();
        let mut successes = 0;
        let mut position: i64 = 0;
        loop {
            let wait = (self.uniform_positive().ln() / log_q).floor();
            #[allow(
                clippy::cast_possible_truncation,
                reason = "saturating float-to-int cast; any value past trials ends the loop"
            )]
            let step = wait as i64;
            position = position.saturating_add(step).saturating_add(1);
            if position > trials {
                return successes;
            }
            successes += 1;
        }
    }
}

/// `ln(k!)` for a non-negative integral `k`.
fn ln_factorial(k: f64) -> f64 {
    if k < 10.0 {
        let mut total = 0.0;
        let mut i = 2.0;
        while i <= k {
            total += f64::ln(i);
            i += 1.0;
        }
        return total;
    }
    // Stirling series
    let n = k + 1.0;
    (n - 0.5) * n.ln() - n + 0.5 * std::f64::consts::TAU.ln() + 1.0 / (12.0 * n)
        - 1.0 / (360.0 * n * n * n)
}
