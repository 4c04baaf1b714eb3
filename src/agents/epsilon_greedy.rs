//! Epsilon-greedy bandit agent.
use super::{AgentCore, ArmStats, BanditAgent, BuildBanditAgent};
use crate::envs::{BernoulliBandit, InvalidArmError};
use crate::error::ConfigurationError;
use crate::utils::iter::ArgMaxBy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for an [`EpsilonGreedyAgent`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedyConfig {
    /// Probability of exploring with a uniformly random arm. Must lie in (0, 1).
    pub epsilon: f64,
}

impl EpsilonGreedyConfig {
    pub const fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl BuildBanditAgent for EpsilonGreedyConfig {
    type Agent = EpsilonGreedyAgent;

    fn build_agent(
        &self,
        time_horizon: u64,
        environment: BernoulliBandit,
        seed: u64,
    ) -> Result<Self::Agent, ConfigurationError> {
        EpsilonGreedyAgent::new(time_horizon, environment, self.epsilon, seed)
    }
}

/// An epsilon-greedy agent.
///
/// With probability epsilon selects a uniformly random arm, otherwise the arm
/// with the highest empirical mean reward, ties to the lowest index.
///
/// Arms that have never been pulled count as having empirical mean 0 rather
/// than being excluded or prioritized: cold arms get no special treatment
/// beyond the epsilon exploration mechanism itself.
#[derive(Debug, Clone)]
pub struct EpsilonGreedyAgent {
    core: AgentCore,
    epsilon: f64,
    arms: Vec<ArmStats>,
    rng: StdRng,
}

impl EpsilonGreedyAgent {
    pub fn new(
        time_horizon: u64,
        environment: BernoulliBandit,
        epsilon: f64,
        seed: u64,
    ) -> Result<Self, ConfigurationError> {
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(ConfigurationError::EpsilonOutOfRange { value: epsilon });
        }
        let core = AgentCore::new(time_horizon, environment)?;
        let arms = vec![ArmStats::default(); core.num_arms()];
        Ok(Self {
            core,
            epsilon,
            arms,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    fn select_arm(&mut self) -> usize {
        if self.rng.gen::<f64>() < self.epsilon {
            self.rng.gen_range(0..self.arms.len())
        } else {
            self.arms
                .iter()
                .map(|stats| stats.mean().unwrap_or(0.0))
                .argmax_by(|a, b| a.partial_cmp(b).unwrap())
                .expect("at least one arm")
        }
    }
}

impl fmt::Display for EpsilonGreedyAgent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EpsilonGreedyAgent(ϵ={})", self.epsilon)
    }
}

impl BanditAgent for EpsilonGreedyAgent {
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
mod epsilon_greedy_agent {
    use super::super::{testing, AgentDef};
    use super::*;

    #[test]
    fn epsilon_zero_rejected() {
        let env = BernoulliBandit::new(vec![0.5], 0).unwrap();
        assert_eq!(
            EpsilonGreedyAgent::new(100, env, 0.0, 0).unwrap_err(),
            ConfigurationError::EpsilonOutOfRange { value: 0.0 }
        );
    }

    #[test]
    fn epsilon_one_rejected() {
        let env = BernoulliBandit::new(vec![0.5], 0).unwrap();
        assert!(EpsilonGreedyAgent::new(100, env, 1.0, 0).is_err());
    }

    #[test]
    fn exploits_best_observed_arm() {
        // Deterministic arms: after any observation of arm 1 the greedy
        // choice must stay on arm 1 whenever the agent is not exploring.
        let env = BernoulliBandit::new(vec![0.0, 1.0], 0).unwrap();
        let mut agent = EpsilonGreedyAgent::new(1000, env, 0.1, 0).unwrap();
        for _ in 0..1000 {
            agent.give_pull().unwrap();
        }
        let counts = agent.pull_counts();
        assert!(counts[1] > counts[0]);
    }

    #[test]
    fn learns_bernoulli_bandit() {
        testing::check_learns_bernoulli_bandit(
            &AgentDef::EpsilonGreedy(EpsilonGreedyConfig::default()),
            1000,
        );
    }
}
