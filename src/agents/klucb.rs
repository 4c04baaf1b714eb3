//! KL-UCB bandit agent.
use super::{AgentCore, ArmStats, BanditAgent, BuildBanditAgent, ConfidenceBound};
use crate::envs::{BernoulliBandit, InvalidArmError};
use crate::error::ConfigurationError;
use crate::utils::iter::ArgMaxBy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clamp bound keeping probabilities away from the log singularities at 0 and 1.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Enough bisection steps to shrink the bracket below double-precision noise.
const BISECTION_ITERATIONS: u32 = 30;

/// Bernoulli KL-divergence `KL(p, q)`.
///
/// Both operands are clamped to `[ε, 1−ε]` before evaluation.
fn kl_bernoulli(p: f64, q: f64) -> f64 {
    let p = p.clamp(BOUNDARY_EPSILON, 1.0 - BOUNDARY_EPSILON);
    let q = q.clamp(BOUNDARY_EPSILON, 1.0 - BOUNDARY_EPSILON);
    p * (p / q).ln() + (1.0 - p) * ((1.0 - p) / (1.0 - q)).ln()
}

/// The largest `q` in `[p, 1−ε]` with `KL(p, q) <= target`.
///
/// Bisection over the upper branch, where KL is increasing in `q`: the lower
/// bound moves up while the divergence stays below `target`, and the upper
/// bound is returned after a fixed number of iterations.
fn solve_upper_bound(p: f64, target: f64) -> f64 {
    let mut low = p;
    let mut high = 1.0 - BOUNDARY_EPSILON;
    for _ in 0..BISECTION_ITERATIONS {
        let mid = 0.5 * (low + high);
        if kl_bernoulli(p, mid) < target {
            low = mid;
        } else {
            high = mid;
        }
    }
    high
}

/// Configuration for a [`KlUcbAgent`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KlUcbConfig {
    /// Coefficient of the secondary `ln(ln t)` term in the confidence target.
    ///
    /// Zero disables the correction, giving the standard KL-UCB target
    /// `ln(t) / pulls`.
    pub log_log_scale: f64,
}

impl KlUcbConfig {
    pub const fn new(log_log_scale: f64) -> Self {
        Self { log_log_scale }
    }
}

impl Default for KlUcbConfig {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl BuildBanditAgent for KlUcbConfig {
    type Agent = KlUcbAgent;

    fn build_agent(
        &self,
        time_horizon: u64,
        environment: BernoulliBandit,
        _seed: u64,
    ) -> Result<Self::Agent, ConfigurationError> {
        KlUcbAgent::new(time_horizon, environment, self.log_log_scale)
    }
}

/// A KL-UCB agent (Garivier and Cappé 2011).
///
/// Pulls each arm once in index order, then selects the arm whose
/// KL-divergence confidence bound is largest: the largest `q` above the
/// empirical mean with `KL(mean, q)` within the per-arm target
/// `ln(t) / pulls`. The bound is tighter than the Hoeffding-style UCB1 bonus
/// for means near 0 or 1.
///
/// Arms that have never been pulled take an unbounded confidence value and so
/// are selected before any arm with a finite bound.
#[derive(Debug, Clone)]
pub struct KlUcbAgent {
    core: AgentCore,
    log_log_scale: f64,
    arms: Vec<ArmStats>,
}

impl KlUcbAgent {
    pub fn new(
        time_horizon: u64,
        environment: BernoulliBandit,
        log_log_scale: f64,
    ) -> Result<Self, ConfigurationError> {
        let core = AgentCore::new(time_horizon, environment)?;
        let arms = vec![ArmStats::default(); core.num_arms()];
        Ok(Self {
            core,
            log_log_scale,
            arms,
        })
    }

    /// The per-arm confidence target `(ln t + c·ln(ln t)) / pulls`.
    #[allow(clippy::cast_precision_loss)]
    fn confidence_target(&self, log_t: f64, pulls: u64) -> f64 {
        let count = pulls as f64;
        let mut target = log_t / count;
        if self.log_log_scale != 0.0 {
            target += self.log_log_scale * log_t.ln() / count;
        }
        target
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn select_arm(&self) -> usize {
        let time_step = self.core.time_step();
        if (time_step as usize) < self.arms.len() {
            // Initialization phase: one pull per arm, in index order.
            return time_step as usize;
        }
        let log_t = (time_step as f64).ln();
        self.arms
            .iter()
            .map(|stats| match *stats {
                ArmStats::Unvisited => ConfidenceBound::Unbounded,
                ArmStats::Visited { pulls, reward_sum } => {
                    let mean = reward_sum / pulls as f64;
                    let target = self.confidence_target(log_t, pulls);
                    ConfidenceBound::Finite(solve_upper_bound(mean, target))
                }
            })
            .argmax_by(|a, b| a.partial_cmp(b).unwrap())
            .expect("at least one arm")
    }
}

impl fmt::Display for KlUcbAgent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KlUcbAgent(c={})", self.log_log_scale)
    }
}

impl BanditAgent for KlUcbAgent {
    fn give_pull(&mut self) -> Result<f64, InvalidArmError> {
        let arm = self.select_arm();
        let reward = self.core.pull(arm)?;
        self.reinforce(reward, arm);
        Ok(reward)
    }

    fn reinforce(&mut self, reward: f64, arm: usize) {
        self.arms[arm].record(reward);
        self.core.record(reward);
    }

    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn pull_counts(&self) -> Vec<u64> {
        self.arms.iter().map(ArmStats::pulls).collect()
    }
}

#[cfg(test)]
mod kl_divergence {
    use super::*;
    use rstest::rstest;

    #[test]
    fn zero_at_equal_probabilities() {
        for p in [0.1, 0.5, 0.9] {
            assert!(kl_bernoulli(p, p).abs() < 1e-12);
        }
    }

    #[rstest]
    #[case(0.1, 0.2)]
    #[case(0.5, 0.75)]
    #[case(0.3, 0.9)]
    fn positive_off_diagonal(#[case] p: f64, #[case] q: f64) {
        assert!(kl_bernoulli(p, q) > 0.0);
    }

    #[test]
    fn increasing_in_q_above_p() {
        let p = 0.3;
        let mut last = 0.0;
        for q in [0.4, 0.5, 0.6, 0.7, 0.8, 0.9] {
            let kl = kl_bernoulli(p, q);
            assert!(kl > last);
            last = kl;
        }
    }

    #[test]
    fn known_value() {
        // KL(0.5, 0.75) = 0.5 ln(2/3) + 0.5 ln 2 ... = 0.5 ln(4/3)
        let expected = 0.5 * (4.0_f64 / 3.0).ln();
        assert!((kl_bernoulli(0.5, 0.75) - expected).abs() < 1e-9);
    }

    #[test]
    fn finite_at_boundaries() {
        assert!(kl_bernoulli(0.0, 0.5).is_finite());
        assert!(kl_bernoulli(1.0, 0.5).is_finite());
        assert!(kl_bernoulli(0.5, 0.0).is_finite());
        assert!(kl_bernoulli(0.5, 1.0).is_finite());
    }
}

#[cfg(test)]
mod bisection {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.1, 0.3)]
    #[case(0.25, 0.5)]
    #[case(0.5, 0.9)]
    #[case(0.75, 0.99)]
    fn recovers_known_root(#[case] p: f64, #[case] q_star: f64) {
        let target = kl_bernoulli(p, q_star);
        let solved = solve_upper_bound(p, target);
        assert!((solved - q_star).abs() < 1e-6);
    }

    #[rstest]
    #[case(0.0, 0.5)]
    #[case(0.2, 0.01)]
    #[case(0.5, 0.1)]
    #[case(0.9, 2.0)]
    #[case(1.0, 0.5)]
    fn bound_between_mean_and_one(#[case] p: f64, #[case] target: f64) {
        let solved = solve_upper_bound(p, target);
        assert!(solved >= p);
        assert!(solved <= 1.0);
    }

    #[test]
    fn zero_target_stays_at_mean() {
        let solved = solve_upper_bound(0.4, 0.0);
        assert!((solved - 0.4).abs() < 1e-6);
    }

    #[test]
    fn large_target_saturates_near_one() {
        let solved = solve_upper_bound(0.5, 1e6);
        assert!(solved > 1.0 - 1e-6);
    }
}
