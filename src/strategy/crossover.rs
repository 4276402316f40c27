use serde::{Deserialize, Serialize};

use super::{Evaluation, Strategy};
use crate::indicators::calculate_sma_pair;
use crate::models::Signal;

/// Window lengths for the crossover
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrossoverConfig {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            short_window: 5,
            long_window: 20,
        }
    }
}

/// Short/long simple moving average crossover
///
/// Averages are recomputed from scratch on every evaluation; no state is
/// carried between polls. Emits:
/// - `Buy` when the short average is above the long average
/// - `Sell` when it is below
/// - `Hold` when they are equal or there is not enough history
#[derive(Debug, Clone)]
pub struct CrossoverStrategy {
    config: CrossoverConfig,
}

impl CrossoverStrategy {
    pub fn new(config: CrossoverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CrossoverConfig {
        &self.config
    }
}

impl Default for CrossoverStrategy {
    fn default() -> Self {
        Self::new(CrossoverConfig::default())
    }
}

impl Strategy for CrossoverStrategy {
    fn evaluate(&self, closes: &[f64]) -> Evaluation {
        let Some((short_avg, long_avg)) =
            calculate_sma_pair(closes, self.config.short_window, self.config.long_window)
        else {
            tracing::debug!(
                available = closes.len(),
                required = self.min_points_required(),
                "Not enough history for crossover, holding"
            );
            return Evaluation::hold();
        };

        let signal = if short_avg > long_avg {
            Signal::Buy
        } else if short_avg < long_avg {
            Signal::Sell
        } else {
            Signal::Hold
        };

        Evaluation {
            signal,
            short_avg: Some(short_avg),
            long_avg: Some(long_avg),
        }
    }

    fn name(&self) -> &str {
        "SmaCrossover"
    }

    fn min_points_required(&self) -> usize {
        self.config.short_window.max(self.config.long_window)
    }
}
