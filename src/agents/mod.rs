//! Bandit decision strategies.
//!
//! Each strategy is an independent concrete type implementing [`BanditAgent`];
//! shared bookkeeping lives in the composed [`AgentCore`] struct rather than
//! in any inherited state.
mod epsilon_greedy;
mod klucb;
pub mod testing;
mod thompson_sampling;
mod ucb;

pub use epsilon_greedy::{EpsilonGreedyAgent, EpsilonGreedyConfig};
pub use klucb::{KlUcbAgent, KlUcbConfig};
pub use thompson_sampling::{BetaPosterior, ThompsonSamplingAgent, ThompsonSamplingConfig};
pub use ucb::{Ucb1Agent, Ucb1Config};

use crate::envs::{BernoulliBandit, InvalidArmError};
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// A bandit decision strategy bound to one environment.
///
/// The driver calls [`give_pull`](Self::give_pull) once per time step; the
/// strategy selects an arm, pulls the environment exactly once, and folds the
/// observation into its statistics before returning.
pub trait BanditAgent: std::fmt::Debug {
    /// Make one decision: select an arm, pull it, reinforce.
    ///
    /// Returns the observed reward (0.0 or 1.0).
    fn give_pull(&mut self) -> Result<f64, InvalidArmError>;

    /// Fold one observation into the strategy statistics.
    ///
    /// Appends to the reward history and increments the time step; called
    /// exactly once per decision.
    fn reinforce(&mut self, reward: f64, arm: usize);

    /// Shared bookkeeping: time step, horizon, reward history, environment.
    fn core(&self) -> &AgentCore;

    /// Times each arm has been selected so far.
    fn pull_counts(&self) -> Vec<u64>;
}

/// Shared bookkeeping for every bandit strategy.
///
/// Owns the environment exclusively: one agent, one environment, for the
/// lifetime of the run. Strategies compose this struct and call
/// [`pull`](Self::pull) / [`record`](Self::record) from their `give_pull` and
/// `reinforce` implementations.
#[derive(Debug, Clone)]
pub struct AgentCore {
    environment: BernoulliBandit,
    time_horizon: u64,
    time_step: u64,
    reward_history: Vec<f64>,
}

impl AgentCore {
    pub fn new(time_horizon: u64, environment: BernoulliBandit) -> Result<Self, ConfigurationError> {
        if time_horizon == 0 {
            return Err(ConfigurationError::ZeroTimeHorizon);
        }
        Ok(Self {
            environment,
            time_horizon,
            time_step: 0,
            reward_history: Vec::new(),
        })
    }

    /// Total planned decision steps.
    pub const fn time_horizon(&self) -> u64 {
        self.time_horizon
    }

    /// Decisions made so far.
    pub const fn time_step(&self) -> u64 {
        self.time_step
    }

    /// Every reward observed so far, in decision order.
    pub fn reward_history(&self) -> &[f64] {
        &self.reward_history
    }

    pub fn num_arms(&self) -> usize {
        self.environment.num_arms()
    }

    pub const fn environment(&self) -> &BernoulliBandit {
        &self.environment
    }

    /// Sample a reward from the environment.
    pub fn pull(&mut self, arm: usize) -> Result<f64, InvalidArmError> {
        self.environment.pull(arm)
    }

    /// Append one observed reward and advance the time step.
    pub fn record(&mut self, reward: f64) {
        self.reward_history.push(reward);
        self.time_step += 1;
    }
}

/// Pull count and accumulated reward of a single arm.
///
/// An arm that has never been pulled is an explicit `Unvisited` state, not a
/// zero-count record, so strategies cannot divide by a zero pull count.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum ArmStats {
    #[default]
    Unvisited,
    Visited { pulls: u64, reward_sum: f64 },
}

impl ArmStats {
    /// Fold in one observed reward.
    pub fn record(&mut self, reward: f64) {
        *self = match *self {
            Self::Unvisited => Self::Visited {
                pulls: 1,
                reward_sum: reward,
            },
            Self::Visited { pulls, reward_sum } => Self::Visited {
                pulls: pulls + 1,
                reward_sum: reward_sum + reward,
            },
        };
    }

    pub const fn pulls(&self) -> u64 {
        match self {
            Self::Unvisited => 0,
            Self::Visited { pulls, .. } => *pulls,
        }
    }

    /// Empirical mean reward, if the arm has been pulled.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<f64> {
        match self {
            Self::Unvisited => None,
            Self::Visited { pulls, reward_sum } => Some(reward_sum / *pulls as f64),
        }
    }
}

/// Upper confidence index of a single arm.
///
/// `Unbounded` marks an arm that must be selected before any arm with a
/// finite bound; the derived ordering places it above every `Finite` value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum ConfidenceBound {
    Finite(f64),
    Unbounded,
}

/// Build a bandit agent from a configuration.
pub trait BuildBanditAgent {
    type Agent: BanditAgent;

    /// Build an agent bound to the given environment.
    ///
    /// # Args
    /// * `time_horizon` - Total planned decision steps; must be positive.
    /// * `environment` - The environment the agent will own for its run.
    /// * `seed` - Seed for any pseudo-randomness used in arm selection.
    fn build_agent(
        &self,
        time_horizon: u64,
        environment: BernoulliBandit,
        seed: u64,
    ) -> Result<Self::Agent, ConfigurationError>;
}

/// Bandit strategy definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentDef {
    /// Epsilon-greedy: explore uniformly with fixed probability.
    EpsilonGreedy(EpsilonGreedyConfig),
    /// UCB1 (Auer 2002) with a Hoeffding-style confidence bonus.
    Ucb1(Ucb1Config),
    /// KL-UCB with a Bernoulli KL-divergence confidence bound.
    KlUcb(KlUcbConfig),
    /// Thompson sampling of Beta posteriors over Bernoulli arms.
    ThompsonSampling(ThompsonSamplingConfig),
}

impl AgentDef {
    /// Strategy name for display and log labels.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EpsilonGreedy(_) => "epsilon-greedy",
            Self::Ucb1(_) => "ucb1",
            Self::KlUcb(_) => "kl-ucb",
            Self::ThompsonSampling(_) => "thompson-sampling",
        }
    }

    /// Construct the configured agent as a trait object.
    pub fn build(
        &self,
        time_horizon: u64,
        environment: BernoulliBandit,
        seed: u64,
    ) -> Result<Box<dyn BanditAgent>, ConfigurationError> {
        use AgentDef::*;
        match self {
            EpsilonGreedy(config) => config
                .build_agent(time_horizon, environment, seed)
                .map(|a| Box::new(a) as _),
            Ucb1(config) => config
                .build_agent(time_horizon, environment, seed)
                .map(|a| Box::new(a) as _),
            KlUcb(config) => config
                .build_agent(time_horizon, environment, seed)
                .map(|a| Box::new(a) as _),
            ThompsonSampling(config) => config
                .build_agent(time_horizon, environment, seed)
                .map(|a| Box::new(a) as _),
        }
    }
}

#[cfg(test)]
mod arm_stats {
    use super::*;

    #[test]
    fn starts_unvisited() {
        let stats = ArmStats::default();
        assert_eq!(stats.pulls(), 0);
        assert_eq!(stats.mean(), None);
    }

    #[test]
    fn record_accumulates() {
        let mut stats = ArmStats::default();
        stats.record(1.0);
        stats.record(0.0);
        stats.record(1.0);
        assert_eq!(stats.pulls(), 3);
        assert!((stats.mean().unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }
}


#[cfg(test)]
mod agent_defs {
    use super::*;
    use rstest::rstest;

    fn all_defs() -> [AgentDef; 4] {
        [
            AgentDef::EpsilonGreedy(EpsilonGreedyConfig::default()),
            AgentDef::Ucb1(Ucb1Config::default()),
            AgentDef::KlUcb(KlUcbConfig::default()),
            AgentDef::ThompsonSampling(ThompsonSamplingConfig::default()),
        ]
    }

    #[rstest]
    #[case::epsilon_greedy(0)]
    #[case::ucb1(1)]
    #[case::klucb(2)]
    #[case::thompson_sampling(3)]
    fn bookkeeping_invariants(#[case] index: usize) {
        testing::check_bookkeeping(&all_defs()[index], &[0.23, 0.55, 0.76, 0.44], 300);
    }

    #[rstest]
    #[case::epsilon_greedy(0)]
    #[case::ucb1(1)]
    #[case::klucb(2)]
    #[case::thompson_sampling(3)]
    fn single_arm_always_selected(#[case] index: usize) {
        testing::check_single_arm_zero_regret(&all_defs()[index]);
    }

    #[rstest]
    #[case::epsilon_greedy(0)]
    #[case::ucb1(1)]
    #[case::klucb(2)]
    #[case::thompson_sampling(3)]
    fn zero_horizon_rejected(#[case] index: usize) {
        let env = crate::envs::BernoulliBandit::new(vec![0.5], 0).unwrap();
        assert_eq!(
            all_defs()[index].build(0, env, 0).unwrap_err(),
            ConfigurationError::ZeroTimeHorizon
        );
    }
}
