//! Bernoulli multi-armed bandit environment.
use crate::error::ConfigurationError;
use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An arm index outside the environment's arm range.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("arm index {arm} is out of range for {num_arms} arms")]
pub struct InvalidArmError {
    pub arm: usize,
    pub num_arms: usize,
}

/// Configuration for a [`BernoulliBandit`].
///
/// Builds a fresh environment per run so that sweep-style drivers never share
/// reward or regret state between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BernoulliBanditConfig {
    /// Success probability of each arm.
    pub probabilities: Vec<f64>,
}

impl BernoulliBanditConfig {
    pub fn new(probabilities: Vec<f64>) -> Self {
        Self { probabilities }
    }

    /// Build an environment instance.
    ///
    /// # Args
    /// * `seed` - Seed for the pseudo-randomness of reward draws.
    pub fn build_env(&self, seed: u64) -> Result<BernoulliBandit, ConfigurationError> {
        BernoulliBandit::new(self.probabilities.clone(), seed)
    }
}

/// A multi-armed bandit with Bernoulli-distribution arm rewards.
///
/// Tracks realized versus optimal expected reward: each [`pull`](Self::pull)
/// appends one entry to a cumulative regret series that collaborators read
/// through [`cumulative_regret`](Self::cumulative_regret).
#[derive(Debug, Clone)]
pub struct BernoulliBandit {
    probabilities: Vec<f64>,
    optimal_probability: f64,
    cumulative_regret: Vec<f64>,
    rng: StdRng,
}

impl BernoulliBandit {
    /// Create an environment from per-arm success probabilities.
    ///
    /// Fails with [`ConfigurationError`] if the arm list is empty or any
    /// probability lies outside `[0, 1]`.
    pub fn new(probabilities: Vec<f64>, seed: u64) -> Result<Self, ConfigurationError> {
        if probabilities.is_empty() {
            return Err(ConfigurationError::EmptyArms);
        }
        for (arm, &value) in probabilities.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::ProbabilityOutOfRange { arm, value });
            }
        }
        let optimal_probability = probabilities.iter().copied().fold(f64::MIN, f64::max);
        Ok(Self {
            probabilities,
            optimal_probability,
            cumulative_regret: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn num_arms(&self) -> usize {
        self.probabilities.len()
    }

    /// The success probability of the best arm.
    pub const fn optimal_probability(&self) -> f64 {
        self.optimal_probability
    }

    /// Read-only view of the cumulative regret series.
    ///
    /// One entry per completed `pull`; monotonically non-decreasing.
    pub fn cumulative_regret(&self) -> &[f64] {
        &self.cumulative_regret
    }

    /// Total regret accumulated so far. Zero before the first pull.
    pub fn total_regret(&self) -> f64 {
        self.cumulative_regret.last().copied().unwrap_or(0.0)
    }

    /// Sample a reward from one arm.
    ///
    /// Draws a Bernoulli sample with the arm's success probability, extends
    /// the regret series by the gap between the optimal and the pulled arm's
    /// expected reward, and returns the sampled reward (0.0 or 1.0).
    ///
    /// # Errors
    /// [`InvalidArmError`] if `arm` is out of range; the regret series is not
    /// mutated in that case.
    pub fn pull(&mut self, arm: usize) -> Result<f64, InvalidArmError> {
        let prob = *self.probabilities.get(arm).ok_or(InvalidArmError {
            arm,
            num_arms: self.probabilities.len(),
        })?;
        let reward = Bernoulli::new(prob).unwrap().sample(&mut self.rng);
        self.cumulative_regret
            .push(self.total_regret() + (self.optimal_probability - prob));
        Ok(u8::from(reward).into())
    }
}

impl fmt::Display for BernoulliBandit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BernoulliBandit({:?})", self.probabilities)
    }
}

#[cfg(test)]
mod bernoulli_bandit {
    use super::*;

    #[test]
    fn empty_arms_rejected() {
        assert_eq!(
            BernoulliBandit::new(vec![], 0).unwrap_err(),
            ConfigurationError::EmptyArms
        );
    }

    #[test]
    fn out_of_range_probability_rejected() {
        let result = BernoulliBandit::new(vec![0.5, 1.2], 0);
        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::ProbabilityOutOfRange {
                arm: 1,
                value: 1.2
            }
        );
    }

    #[test]
    fn nan_probability_rejected() {
        assert!(BernoulliBandit::new(vec![f64::NAN], 0).is_err());
    }

    #[test]
    fn optimal_probability_is_max() {
        let env = BernoulliBandit::new(vec![0.23, 0.55, 0.76, 0.44], 0).unwrap();
        assert_eq!(env.optimal_probability(), 0.76);
    }

    #[test]
    fn deterministic_rewards() {
        let mut env = BernoulliBandit::new(vec![0.0, 1.0], 0).unwrap();
        for _ in 0..10 {
            assert_eq!(env.pull(0).unwrap(), 0.0);
            assert_eq!(env.pull(1).unwrap(), 1.0);
        }
    }

    #[test]
    fn regret_series_tracks_pulled_arms() {
        let mut env = BernoulliBandit::new(vec![0.1, 0.9], 0).unwrap();
        env.pull(0).unwrap();
        env.pull(1).unwrap();
        env.pull(0).unwrap();
        let regret = env.cumulative_regret();
        assert_eq!(regret.len(), 3);
        assert!((regret[0] - 0.8).abs() < 1e-12);
        assert!((regret[1] - 0.8).abs() < 1e-12);
        assert!((regret[2] - 1.6).abs() < 1e-12);
        assert!((env.total_regret() - 1.6).abs() < 1e-12);
    }

    #[test]
    fn single_arm_zero_regret() {
        let mut env = BernoulliBandit::new(vec![0.6], 0).unwrap();
        for _ in 0..100 {
            env.pull(0).unwrap();
        }
        assert!(env.cumulative_regret().iter().all(|&r| r == 0.0));
    }

    #[test]
    fn invalid_arm_fails_without_mutation() {
        let mut env = BernoulliBandit::new(vec![0.1, 0.9], 0).unwrap();
        env.pull(1).unwrap();
        let error = env.pull(2).unwrap_err();
        assert_eq!(error, InvalidArmError { arm: 2, num_arms: 2 });
        assert_eq!(env.cumulative_regret().len(), 1);
    }

    #[test]
    fn same_seed_same_rewards() {
        let probabilities = vec![0.3, 0.7];
        let mut a = BernoulliBandit::new(probabilities.clone(), 53).unwrap();
        let mut b = BernoulliBandit::new(probabilities, 53).unwrap();
        for arm in [0, 1, 1, 0, 1] {
            assert_eq!(a.pull(arm).unwrap(), b.pull(arm).unwrap());
        }
    }
}
