//! Bandit reward environments
mod bernoulli;

pub use bernoulli::{BernoulliBandit, BernoulliBanditConfig, InvalidArmError};
