//! Command-line logger
use super::{Event, Logger};
use enum_map::{enum_map, EnumMap};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use yansi::Paint;

/// Logger that periodically writes event summaries to standard output.
///
/// Scalars logged under the same name are averaged over the summary period
/// and cleared after each display.
pub struct CLILogger {
    events: EnumMap<Event, EventLog>,

    display_period: Duration,
    last_display_time: Instant,
}

impl CLILogger {
    pub fn new(display_period: Duration) -> Self {
        Self {
            events: enum_map! { _ => EventLog::new() },
            display_period,
            last_display_time: Instant::now(),
        }
    }

    /// Display the summary and clear all stored data.
    pub fn display(&mut self) {
        for (event, event_log) in &mut self.events {
            let summary_size = event_log.index - event_log.summary_start_index;
            if summary_size == 0 {
                continue;
            }

            println!(
                "{}",
                Paint::fixed(
                    35,
                    format_args!(
                        "==== {:?}s {} - {} ====",
                        event,
                        event_log.summary_start_index,
                        event_log.index - 1
                    )
                )
            );
            for (name, aggregator) in &mut event_log.aggregators {
                if let Some(mean) = aggregator.mean() {
                    println!("{:<16} {:.4}", name, mean);
                }
                aggregator.clear();
            }
            event_log.summary_start_index = event_log.index;
        }
        self.last_display_time = Instant::now();
    }
}

impl Logger for CLILogger {
    fn log(&mut self, event: Event, name: &'static str, value: f64) {
        self.events[event]
            .aggregators
            .entry(name)
            .or_default()
            .push(value);
    }

    fn done(&mut self, event: Event) {
        self.events[event].index += 1;

        if self.last_display_time.elapsed() >= self.display_period {
            self.display();
        }
    }
}

impl Drop for CLILogger {
    fn drop(&mut self) {
        // Flush whatever accumulated since the last display.
        self.display();
    }
}

struct EventLog {
    /// Global index for this event
    index: u64,
    /// Value of `index` at the start of this summary period
    summary_start_index: u64,
    /// An aggregator for each log entry.
    aggregators: BTreeMap<&'static str, MeanAccumulator>,
}

impl EventLog {
    fn new() -> Self {
        Self {
            index: 0,
            summary_start_index: 0,
            aggregators: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default)]
struct MeanAccumulator {
    sum: f64,
    count: u64,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> Option<f64> {
        if self.count > 0 {
            Some(self.sum / self.count as f64)
        } else {
            None
        }
    }

    fn clear(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }
}

#[cfg(test)]
mod mean_accumulator {
    use super::*;

    #[test]
    fn empty_has_no_mean() {
        assert_eq!(MeanAccumulator::default().mean(), None);
    }

    #[test]
    fn averages_pushed_values() {
        let mut acc = MeanAccumulator::default();
        acc.push(1.0);
        acc.push(0.0);
        acc.push(0.5);
        assert!((acc.mean().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn clear_resets() {
        let mut acc = MeanAccumulator::default();
        acc.push(3.0);
        acc.clear();
        assert_eq!(acc.mean(), None);
    }
}
