//! Simulating agent-environment interaction
use crate::agents::{AgentDef, BanditAgent};
use crate::envs::{BernoulliBanditConfig, InvalidArmError};
use crate::error::BanditError;
use crate::logging::{Event, Logger};
use serde::{Deserialize, Serialize};

/// Measurement outputs of one completed run.
///
/// These are the series that external collaborators (plotting, sweep
/// aggregation) consume; nothing here references live agent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Observed reward per decision, in order.
    pub reward_history: Vec<f64>,
    /// Times each arm was selected.
    pub pull_counts: Vec<u64>,
    /// Environment regret series, one entry per decision, non-decreasing.
    pub cumulative_regret: Vec<f64>,
}

impl RunSummary {
    /// Regret accumulated over the whole run.
    pub fn final_regret(&self) -> f64 {
        self.cumulative_regret.last().copied().unwrap_or(0.0)
    }

    pub fn total_reward(&self) -> f64 {
        self.reward_history.iter().sum()
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn mean_reward(&self) -> f64 {
        if self.reward_history.is_empty() {
            0.0
        } else {
            self.total_reward() / self.reward_history.len() as f64
        }
    }
}

/// Run an agent for exactly its time horizon.
///
/// Calls [`BanditAgent::give_pull`] sequentially; each call fully completes
/// (environment pull, statistic update, history append) before the next.
/// There is no mid-run abort: a run always executes `time_horizon` decisions
/// unless the environment reports a defect.
pub fn run_agent<A>(agent: &mut A, logger: &mut dyn Logger) -> Result<RunSummary, InvalidArmError>
where
    A: BanditAgent + ?Sized,
{
    for _ in 0..agent.core().time_horizon() {
        let reward = agent.give_pull()?;
        logger.log(Event::Step, "reward", reward);
        logger.log(Event::Step, "regret", agent.core().environment().total_regret());
        logger.done(Event::Step);
    }
    let summary = RunSummary {
        reward_history: agent.core().reward_history().to_vec(),
        pull_counts: agent.pull_counts(),
        cumulative_regret: agent.core().environment().cumulative_regret().to_vec(),
    };
    logger.log(Event::Run, "final_regret", summary.final_regret());
    logger.log(Event::Run, "mean_reward", summary.mean_reward());
    logger.done(Event::Run);
    Ok(summary)
}

/// A set of strategies evaluated on a common environment configuration.
///
/// Each pairing gets a freshly built environment and fresh statistics:
/// no arm counts, rewards, or regret are shared between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub environment: BernoulliBanditConfig,
    pub time_horizon: u64,
    pub agents: Vec<AgentDef>,
}

impl Experiment {
    /// Run every configured strategy once, in order.
    ///
    /// # Args
    /// * `env_seed` - Random seed used to derive each run's environment seed.
    /// * `agent_seed` - Random seed used to derive each run's agent seed.
    /// * `logger` - The logger for all runs.
    pub fn run(
        &self,
        env_seed: u64,
        agent_seed: u64,
        logger: &mut dyn Logger,
    ) -> Result<Vec<RunSummary>, BanditError> {
        let mut summaries = Vec::with_capacity(self.agents.len());
        for (i, def) in self.agents.iter().enumerate() {
            let offset = i as u64;
            let env = self.environment.build_env(env_seed.wrapping_add(offset))?;
            let mut agent = def.build(self.time_horizon, env, agent_seed.wrapping_add(offset))?;
            summaries.push(run_agent(agent.as_mut(), logger)?);
        }
        Ok(summaries)
    }
}


#[cfg(test)]
mod experiment {
    use super::*;
    use crate::agents::{
        EpsilonGreedyConfig, KlUcbConfig, ThompsonSamplingConfig, Ucb1Config,
    };

    fn four_agent_experiment() -> Experiment {
        Experiment {
            environment: BernoulliBanditConfig::new(vec![0.23, 0.55, 0.76, 0.44]),
            time_horizon: 200,
            agents: vec![
                AgentDef::EpsilonGreedy(EpsilonGreedyConfig::default()),
                AgentDef::Ucb1(Ucb1Config::default()),
                AgentDef::KlUcb(KlUcbConfig::default()),
                AgentDef::ThompsonSampling(ThompsonSamplingConfig),
            ],
        }
    }

    #[test]
    fn one_summary_per_agent() {
        let experiment = four_agent_experiment();
        let summaries = experiment.run(0, 0, &mut ()).unwrap();
        assert_eq!(summaries.len(), 4);
        for summary in &summaries {
            assert_eq!(summary.reward_history.len(), 200);
            assert_eq!(summary.pull_counts.len(), 4);
        }
    }

    #[test]
    fn runs_are_independent() {
        // Re-running the same experiment must reproduce identical results:
        // no state survives between runs.
        let experiment = four_agent_experiment();
        let first = experiment.run(31, 47, &mut ()).unwrap();
        let second = experiment.run(31, 47, &mut ()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn round_trips_through_json() {
        let experiment = four_agent_experiment();
        let encoded = serde_json::to_string(&experiment).unwrap();
        let decoded: Experiment = serde_json::from_str(&encoded).unwrap();
        assert_eq!(experiment, decoded);
    }
}
