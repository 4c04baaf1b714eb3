//! Error type
use crate::envs::InvalidArmError;
use thiserror::Error;

/// Error from the bandit simulation crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BanditError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    InvalidArm(#[from] InvalidArmError),
}

/// Invalid construction parameter for an environment or agent.
///
/// Raised before any simulation step runs. A malformed configuration is a
/// caller defect, not a transient condition, and aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("environment must have at least one arm")]
    EmptyArms,
    #[error("arm {arm} success probability {value} is outside [0, 1]")]
    ProbabilityOutOfRange { arm: usize, value: f64 },
    #[error("time horizon must be positive")]
    ZeroTimeHorizon,
    #[error("epsilon {value} is outside the open interval (0, 1)")]
    EpsilonOutOfRange { value: f64 },
}
