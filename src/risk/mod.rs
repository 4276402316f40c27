// Risk management module
pub mod daily_loss;

pub use daily_loss::{DailyLossGuard, DailyLossTrip};
