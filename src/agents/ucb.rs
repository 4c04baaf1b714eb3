//! Upper confidence bound bandit agent.
use super::{AgentCore, ArmStats, BanditAgent, BuildBanditAgent, ConfidenceBound};
use crate::envs::{BernoulliBandit, InvalidArmError};
use crate::error::ConfigurationError;
use crate::utils::iter::ArgMaxBy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a [`Ucb1Agent`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ucb1Config {
    /// Scale factor inside the confidence bonus; controls the exploration rate.
    ///
    /// A value of 2 gives the classical UCB1 bonus of Auer (2002).
    pub exploration_rate: f64,
}

impl Ucb1Config {
    pub const fn new(exploration_rate: f64) -> Self {
        Self { exploration_rate }
    }
}

impl Default for Ucb1Config {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl BuildBanditAgent for Ucb1Config {
    type Agent = Ucb1Agent;

    fn build_agent(
        &self,
        time_horizon: u64,
        environment: BernoulliBandit,
        _seed: u64,
    ) -> Result<Self::Agent, ConfigurationError> {
        Ucb1Agent::new(time_horizon, environment, self.exploration_rate)
    }
}

/// A UCB1 agent (Auer 2002).
///
/// Pulls each arm once in index order, then selects
/// `argmax(mean[arm] + sqrt(c * ln(t) / pulls[arm]))` with `t` the number of
/// decisions made so far, ties to the lowest index. The initialization phase
/// guarantees every arm has at least one observation before any mean is
/// evaluated.
#[derive(Debug, Clone)]
pub struct Ucb1Agent {
    core: AgentCore,
    exploration_rate: f64,
    arms: Vec<ArmStats>,
}

impl Ucb1Agent {
    pub fn new(
        time_horizon: u64,
        environment: BernoulliBandit,
        exploration_rate: f64,
    ) -> Result<Self, ConfigurationError> {
        let core = AgentCore::new(time_horizon, environment)?;
        let arms = vec![ArmStats::default(); core.num_arms()];
        Ok(Self {
            core,
            exploration_rate,
            arms,
        })
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
                    let count = pulls as f64;
                    let bonus = (self.exploration_rate * log_t / count).sqrt();
                    ConfidenceBound::Finite(reward_sum / count + bonus)
                }
            })
            .argmax_by(|a, b| a.partial_cmp(b).unwrap())
            .expect("at least one arm")
    }
}

impl fmt::Display for Ucb1Agent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ucb1Agent(c={})", self.exploration_rate)
    }
}

impl BanditAgent for Ucb1Agent {
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
mod ucb1_agent {
    use super::super::{testing, AgentDef};
    use super::*;

    #[test]
    fn initialization_pulls_every_arm_once() {
        let env = BernoulliBandit::new(vec![0.2, 0.4, 0.6], 0).unwrap();
        let mut agent = Ucb1Agent::new(100, env, 2.0).unwrap();
        for _ in 0..3 {
            agent.give_pull().unwrap();
        }
        assert_eq!(agent.pull_counts(), vec![1, 1, 1]);
    }

    #[test]
    fn learns_bernoulli_bandit() {
        testing::check_learns_bernoulli_bandit(&AgentDef::Ucb1(Ucb1Config::default()), 1000);
    }

    #[test]
    fn prefers_high_arm_on_deterministic_bandit() {
        let env = BernoulliBandit::new(vec![0.0, 1.0], 0).unwrap();
        let mut agent = Ucb1Agent::new(1000, env, 2.0).unwrap();
        for _ in 0..1000 {
            agent.give_pull().unwrap();
        }
        let counts = agent.pull_counts();
        assert!(counts[1] > 900);
    }
}
