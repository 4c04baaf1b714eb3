//! Thompson sampling bandit agent
use super::{AgentCore, BanditAgent, BuildBanditAgent};
use crate::envs::{BernoulliBandit, InvalidArmError};
use crate::error::ConfigurationError;
use crate::utils::iter::ArgMaxBy;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Beta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a [`ThompsonSamplingAgent`]
///
/// Thompson sampling takes no tunable parameters: the Beta(1, 1) prior is
/// fixed and the posterior update is exact.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThompsonSamplingConfig;

impl BuildBanditAgent for ThompsonSamplingConfig {
    type Agent = ThompsonSamplingAgent;

    fn build_agent(
        &self,
        time_horizon: u64,
        environment: BernoulliBandit,
        seed: u64,
    ) -> Result<Self::Agent, ConfigurationError> {
        ThompsonSamplingAgent::new(time_horizon, environment, seed)
    }
}

/// Beta posterior over one arm's success probability.
///
/// Starts from the uniform Beta(1, 1) prior, so
/// `alpha + beta == pulls + 2` at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetaPosterior {
    /// Shape parameter counting observed successes plus one.
    pub alpha: u64,
    /// Shape parameter counting observed failures plus one.
    pub beta: u64,
}

impl BetaPosterior {
    const fn uniform_prior() -> Self {
        Self { alpha: 1, beta: 1 }
    }

    const fn pulls(&self) -> u64 {
        self.alpha + self.beta - 2
    }

    #[allow(clippy::cast_precision_loss)]
    fn sample(&self, rng: &mut StdRng) -> f64 {
        Beta::new(self.alpha as f64, self.beta as f64)
            .unwrap()
            .sample(rng)
    }
}

/// A Thompson sampling agent for Bernoulli rewards with Beta priors.
///
/// Each decision samples every arm's posterior and pulls the argmax, then
/// performs the exact Bayesian update for the observed reward. No
/// initialization phase is needed: the uniform prior supports sampling for
/// all arms from the first step.
#[derive(Debug, Clone)]
pub struct ThompsonSamplingAgent {
    core: AgentCore,
    posteriors: Vec<BetaPosterior>,
    rng: StdRng,
}

impl ThompsonSamplingAgent {
    pub fn new(
        time_horizon: u64,
        environment: BernoulliBandit,
        seed: u64,
    ) -> Result<Self, ConfigurationError> {
        let core = AgentCore::new(time_horizon, environment)?;
        let posteriors = vec![BetaPosterior::uniform_prior(); core.num_arms()];
        Ok(Self {
            core,
            posteriors,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Current per-arm posteriors.
    pub fn posteriors(&self) -> &[BetaPosterior] {
        &self.posteriors
    }

    fn select_arm(&mut self) -> usize {
        // Reborrow per call so the closure does not consume the reference.
        let rng = &mut self.rng;
        self.posteriors
            .iter()
            .map(|posterior| posterior.sample(&mut *rng))
            .argmax_by(|a, b| a.partial_cmp(b).unwrap())
            .expect("at least one arm")
    }
}

impl fmt::Display for ThompsonSamplingAgent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ThompsonSamplingAgent({} arms)", self.posteriors.len())
    }
}

impl BanditAgent for ThompsonSamplingAgent {
    fn give_pull(&mut self) -> Result<f64, InvalidArmError> {
        let arm = self.select_arm();
        let reward = self.core.pull(arm)?;
        self.reinforce(reward, arm);
        Ok(reward)
    }

    fn reinforce(&mut self, reward: f64, arm: usize) {
        let posterior = &mut self.posteriors[arm];
        if reward > 0.5 {
            posterior.alpha += 1;
        } else {
            posterior.beta += 1;
        }
        self.core.record(reward);
    }

    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn pull_counts(&self) -> Vec<u64> {
        self.posteriors.iter().map(BetaPosterior::pulls).collect()
    }
}
