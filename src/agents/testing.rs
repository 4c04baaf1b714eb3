//! Agent testing utilities
use super::AgentDef;
use crate::envs::BernoulliBandit;
use crate::simulation::run_agent;

/// Check the shared bookkeeping contract after a full run.
///
/// Every strategy must satisfy `sum(pull_counts) == N == reward_history.len()`
/// after N decisions, with one monotonically non-decreasing regret entry per
/// decision and every reward in {0, 1}.
pub fn check_bookkeeping(def: &AgentDef, probabilities: &[f64], time_horizon: u64) {
    let env = BernoulliBandit::new(probabilities.to_vec(), 61).unwrap();
    let mut agent = def.build(time_horizon, env, 17).unwrap();
    let summary = run_agent(agent.as_mut(), &mut ()).unwrap();

    assert_eq!(agent.core().time_step(), time_horizon);
    assert_eq!(summary.reward_history.len() as u64, time_horizon);
    assert_eq!(summary.pull_counts.iter().sum::<u64>(), time_horizon);
    assert_eq!(summary.cumulative_regret.len() as u64, time_horizon);
    assert!(summary
        .reward_history
        .iter()
        .all(|&reward| reward == 0.0 || reward == 1.0));
    assert!(summary
        .cumulative_regret
        .windows(2)
        .all(|pair| pair[1] >= pair[0]));
}

/// Check that the strategy concentrates on the better of two arms.
///
/// Runs on a `[0.1, 0.9]` bandit: the good arm must be pulled strictly more
/// than the bad arm and the final regret must stay well below the worst-case
/// `0.8 × horizon` of always pulling the bad arm.
#[allow(clippy::cast_precision_loss)]
pub fn check_learns_bernoulli_bandit(def: &AgentDef, time_horizon: u64) {
    let env = BernoulliBandit::new(vec![0.1, 0.9], 7).unwrap();
    let mut agent = def.build(time_horizon, env, 3).unwrap();
    let summary = run_agent(agent.as_mut(), &mut ()).unwrap();

    assert!(summary.pull_counts[1] > summary.pull_counts[0]);
    assert!(summary.final_regret() < 0.4 * time_horizon as f64);
}

/// Check the degenerate single-arm environment.
///
/// With only one arm every strategy must select arm 0 at each step and the
/// cumulative regret must remain exactly 0 for the whole run.
pub fn check_single_arm_zero_regret(def: &AgentDef) {
    let time_horizon = 500;
    let env = BernoulliBandit::new(vec![0.6], 11).unwrap();
    let mut agent = def.build(time_horizon, env, 5).unwrap();
    let summary = run_agent(agent.as_mut(), &mut ()).unwrap();

    assert_eq!(summary.pull_counts, vec![time_horizon]);
    assert!(summary.cumulative_regret.iter().all(|&regret| regret == 0.0));
}
