use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::execution::Ledger;

/// Stops new trades once today's realized loss reaches the limit
///
/// Without `enforce` the guard only reports; trading carries on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLossGuard {
    /// Loss allowed per UTC day, in P&L units (positive number)
    pub limit: f64,
    pub enforce: bool,
}

impl Default for DailyLossGuard {
    fn default() -> Self {
        Self {
            limit: 5.0,
            enforce: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyLossTrip {
    pub realized_today: f64,
    pub limit: f64,
}

impl DailyLossGuard {
    pub fn new(limit: f64, enforce: bool) -> Self {
        Self { limit, enforce }
    }

    /// Check today's realized P&L in the ledger.
    ///
    /// Returns `Err` only when the limit is reached and enforcement is on.
    /// A day without a realized loss never trips, whatever the limit.
    pub fn check(&self, ledger: &Ledger, now: DateTime<Utc>) -> Result<(), DailyLossTrip> {
        let realized_today = ledger.pnl_on(now.date_naive());

        if realized_today >= 0.0 || realized_today > -self.limit {
            return Ok(());
        }

        let trip = DailyLossTrip {
            realized_today,
            limit: self.limit,
        };

        if self.enforce {
            Err(trip)
        } else {
            tracing::warn!(
                realized_today,
                limit = self.limit,
                "Daily loss limit reached (not enforced)"
            );
            Ok(())
        }
    }
}
