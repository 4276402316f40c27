// Trading strategy module
pub mod crossover;

pub use crossover::{CrossoverConfig, CrossoverStrategy};

use crate::models::Signal;

/// Result of evaluating a strategy against a price history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub signal: Signal,
    pub short_avg: Option<f64>,
    pub long_avg: Option<f64>,
}

impl Evaluation {
    pub fn hold() -> Self {
        Self {
            signal: Signal::Hold,
            short_avg: None,
            long_avg: None,
        }
    }
}

/// Base trait for all trading strategies
pub trait Strategy: Send + Sync {
    /// Evaluate closing prices (oldest first) and decide what to do
    fn evaluate(&self, closes: &[f64]) -> Evaluation;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Minimum observations before the strategy emits anything but hold
    fn min_points_required(&self) -> usize;
}
