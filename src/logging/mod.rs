//! Logging statistics from simulation runs
pub mod cli;

pub use cli::CLILogger;

use enum_map::Enum;

/// Simulation run events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Event {
    /// One agent decision step.
    Step,
    /// One completed run over a full time horizon.
    Run,
}

/// Log statistics from a simulation run.
pub trait Logger {
    /// Log a scalar value under a name associated with an event.
    ///
    /// Values logged under the same name within one summary period are
    /// aggregated by taking means.
    fn log(&mut self, event: Event, name: &'static str, value: f64);

    /// Mark the end of an event.
    fn done(&mut self, event: Event);
}

/// Logger that does nothing
impl Logger for () {
    fn log(&mut self, _: Event, _: &'static str, _: f64) {}

    fn done(&mut self, _: Event) {}
}
