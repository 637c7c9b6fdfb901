//! Recoil sampling
//!
//! Each top owns its own random source so a match is reproducible from its
//! seed and tests can swap in a fixed value.

use std::fmt;

use rand::SeedableRng;
use rand_distr::{Distribution, LogNormal};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Source of the random recoil component of an impact.
///
/// Implementations must return a non-negative value.
pub trait RecoilSampler: fmt::Debug + Send {
    fn sample(&mut self) -> f64;
}

/// Log-normal recoil with a given arithmetic mean and standard deviation
#[derive(Clone)]
pub struct LogNormalRecoil {
    distribution: LogNormal<f64>,
    rng: Pcg32,
    mean: f64,
    stddev: f64,
}

impl LogNormalRecoil {
    /// `mean` and `stddev` describe the log-normal samples themselves, not the
    /// underlying normal.
    pub fn new(mean: f64, stddev: f64, seed: u64) -> SimResult<Self> {
        if !(mean.is_finite() && mean > 0.0) || !(stddev.is_finite() && stddev >= 0.0) {
            return Err(SimError::InvalidPart(format!(
                "recoil distribution needs mean > 0 and stddev >= 0, got {mean} / {stddev}"
            )));
        }

        let variance = stddev * stddev;
        let mu = (mean * mean / (variance + mean * mean).sqrt()).ln();
        let sigma = (1.0 + variance / (mean * mean)).ln().sqrt();
        let distribution = LogNormal::new(mu, sigma)
            .map_err(|e| SimError::InvalidPart(format!("recoil distribution: {e}")))?;

        Ok(Self {
            distribution,
            rng: Pcg32::seed_from_u64(seed),
            mean,
            stddev,
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn stddev(&self) -> f64 {
        self.stddev
    }
}

impl fmt::Debug for LogNormalRecoil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogNormalRecoil")
            .field("mean", &self.mean)
            .field("stddev", &self.stddev)
            .finish_non_exhaustive()
    }
}

impl RecoilSampler for LogNormalRecoil {
    fn sample(&mut self) -> f64 {
        self.distribution.sample(&mut self.rng)
    }
}

/// Deterministic recoil that always returns the same value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRecoil(pub f64);

impl RecoilSampler for FixedRecoil {
    fn sample(&mut self) -> f64 {
        self.0.max(0.0)
    }
}

/// Serializable recoil description carried by a top part
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecoilParams {
    pub mean: f64,
    pub stddev: f64,
}

impl Default for RecoilParams {
    fn default() -> Self {
        Self {
            mean: 1.0,
            stddev: 0.25,
        }
    }
}

impl RecoilParams {
    /// Build a seeded sampler for these parameters
    pub fn sampler(&self, seed: u64) -> SimResult<LogNormalRecoil> {
        LogNormalRecoil::new(self.mean, self.stddev, seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_non_negative() {
        let mut recoil = LogNormalRecoil::new(1.0, 0.25, 7).unwrap();
        for _ in 0..1000 {
            assert!(recoil.sample() >= 0.0);
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = LogNormalRecoil::new(1.0, 0.25, 1234).unwrap();
        let mut b = LogNormalRecoil::new(1.0, 0.25, 1234).unwrap();
        for _ in 0..32 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn test_sample_mean_matches_parameters() {
        let mut recoil = LogNormalRecoil::new(2.0, 0.5, 99).unwrap();
        let n = 20_000;
        let total: f64 = (0..n).map(|_| recoil.sample()).sum();
        let mean = total / n as f64;
        assert!((mean - 2.0).abs() < 0.05, "sample mean {mean}");
    }

    #[test]
    fn test_zero_stddev_is_constant() {
        let mut recoil = LogNormalRecoil::new(1.5, 0.0, 3).unwrap();
        for _ in 0..8 {
            assert!((recoil.sample() - 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(LogNormalRecoil::new(0.0, 0.25, 1).is_err());
        assert!(LogNormalRecoil::new(1.0, -0.1, 1).is_err());
        assert!(LogNormalRecoil::new(f64::NAN, 0.1, 1).is_err());
    }

    #[test]
    fn test_fixed_recoil_clamps_negative() {
        assert_eq!(FixedRecoil(0.75).sample(), 0.75);
        assert_eq!(FixedRecoil(-3.0).sample(), 0.0);
    }
}
