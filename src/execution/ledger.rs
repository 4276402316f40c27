use chrono::NaiveDate;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{PnlPoint, TradeRecord};

/// Ledger shared between the trading loop (sole writer) and readers
pub type SharedLedger = Arc<RwLock<Ledger>>;

/// Append-only record of simulated trades
///
/// Total P&L is always derived from the records held, so it cannot drift
/// from them. With a capacity set, only the most recent trades are kept and
/// the total covers those.
///
/// Realized P&L of the latest trading day is accumulated on append, so it
/// still counts trades that have since been evicted.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    trades: VecDeque<TradeRecord>,
    capacity: Option<usize>,
    day_pnl: Option<(NaiveDate, f64)>,
}

/// Read-consistent copy of the ledger for presentation
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub trades: Vec<TradeRecord>,
    pub total_pnl: f64,
}

impl Ledger {
    /// Unbounded ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger keeping at most `capacity` trades, oldest dropped first
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            trades: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
            day_pnl: None,
        }
    }

    pub fn from_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(c) => Self::with_capacity(c),
            None => Self::new(),
        }
    }

    pub fn into_shared(self) -> SharedLedger {
        Arc::new(RwLock::new(self))
    }

    /// The only mutation
    pub fn append(&mut self, trade: TradeRecord) {
        let day = trade.timestamp.date_naive();
        self.day_pnl = match self.day_pnl {
            Some((current, pnl)) if current == day => Some((current, pnl + trade.pnl)),
            // Late trade for an earlier day
            Some((current, pnl)) if current > day => Some((current, pnl)),
            _ => Some((day, trade.pnl)),
        };

        self.trades.push_back(trade);

        if let Some(capacity) = self.capacity {
            while self.trades.len() > capacity {
                if let Some(evicted) = self.trades.pop_front() {
                    tracing::debug!(trade_id = %evicted.id, "Ledger full, dropped oldest trade");
                }
            }
        }
    }

    pub fn trades(&self) -> impl Iterator<Item = &TradeRecord> {
        self.trades.iter()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Sum of P&L over all trades held
    pub fn total_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.pnl).sum()
    }

    /// Realized P&L of trades stamped on the given UTC day.
    ///
    /// Exact for the most recent trading day, evicted trades included. For
    /// earlier days only the retained trades are counted.
    pub fn pnl_on(&self, day: NaiveDate) -> f64 {
        match self.day_pnl {
            Some((current, pnl)) if current == day => pnl,
            Some((current, _)) if current < day => 0.0,
            _ => self
                .trades
                .iter()
                .filter(|t| t.timestamp.date_naive() == day)
                .map(|t| t.pnl)
                .fold(0.0, |acc, pnl| acc + pnl),
        }
    }

    /// Running total after each trade, in recording order
    pub fn cumulative_pnl(&self) -> Vec<PnlPoint> {
        let mut running = 0.0;
        self.trades
            .iter()
            .map(|t| {
                running += t.pnl;
                PnlPoint {
                    timestamp: t.timestamp,
                    cumulative_pnl: running,
                }
            })
            .collect()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            trades: self.trades.iter().cloned().collect(),
            total_pnl: self.total_pnl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradeDirection;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn trade_at(timestamp: DateTime<Utc>, pnl: f64) -> TradeRecord {
        TradeRecord {
            id: Uuid::new_v4(),
            timestamp,
            symbol: "CS.D.DAX.FD.MAR.IP".to_string(),
            action: TradeDirection::Buy,
            size: 1.0,
            entry_price: 100.0,
            exit_price: 100.0 + pnl,
            pnl,
        }
    }

    fn trade(pnl: f64) -> TradeRecord {
        trade_at(Utc::now(), pnl)
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total_pnl(), 0.0);
        assert!(ledger.cumulative_pnl().is_empty());
        assert_eq!(ledger.capacity(), None);
    }

    #[test]
    fn test_total_matches_sum_of_trades() {
        let mut ledger = Ledger::new();
        let pnls = [20.0, 10.0, -7.5, 20.0, 3.25];
        for pnl in pnls {
            ledger.append(trade(pnl));
        }

        let expected: f64 = pnls.iter().sum();
        assert_eq!(ledger.len(), pnls.len());
        assert_eq!(ledger.total_pnl(), expected);
        assert_eq!(ledger.snapshot().total_pnl, expected);
    }

    #[test]
    fn test_duplicate_trades_are_kept() {
        let mut ledger = Ledger::new();
        let record = trade(20.0);
        ledger.append(record.clone());
        ledger.append(record);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total_pnl(), 40.0);
    }

    #[test]
    fn test_capacity_keeps_most_recent() {
        let mut ledger = Ledger::with_capacity(3);
        for i in 0..10 {
            ledger.append(trade(i as f64));
        }

        let kept: Vec<f64> = ledger.trades().map(|t| t.pnl).collect();
        assert_eq!(kept, vec![7.0, 8.0, 9.0]);
        assert_eq!(ledger.total_pnl(), 24.0);
    }

    #[test]
    fn test_cumulative_pnl() {
        let mut ledger = Ledger::new();
        ledger.append(trade(20.0));
        ledger.append(trade(10.0));
        ledger.append(trade(-5.0));

        let curve: Vec<f64> = ledger
            .cumulative_pnl()
            .iter()
            .map(|p| p.cumulative_pnl)
            .collect();
        assert_eq!(curve, vec![20.0, 30.0, 25.0]);
    }

    #[test]
    fn test_pnl_on_day() {
        let yesterday = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        let today = Utc.with_ymd_and_hms(2024, 3, 2, 0, 1, 0).unwrap();

        let mut ledger = Ledger::new();
        ledger.append(trade_at(yesterday, -50.0));
        ledger.append(trade_at(today, 10.0));
        ledger.append(trade_at(today, -4.0));

        assert_eq!(ledger.pnl_on(today.date_naive()), 6.0);
        assert_eq!(ledger.pnl_on(yesterday.date_naive()), -50.0);
        assert_eq!(ledger.pnl_on(today.date_naive().succ_opt().unwrap()), 0.0);
    }

    #[test]
    fn test_pnl_on_day_counts_evicted_trades() {
        let today = Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap();

        let mut ledger = Ledger::with_capacity(1);
        for _ in 0..10 {
            ledger.append(trade_at(today, -2.0));
        }

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total_pnl(), -2.0);
        assert_eq!(ledger.pnl_on(today.date_naive()), -20.0);
    }

    #[test]
    fn test_day_total_resets_on_new_day() {
        let monday = Utc.with_ymd_and_hms(2024, 3, 4, 22, 0, 0).unwrap();
        let tuesday = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();

        let mut ledger = Ledger::with_capacity(2);
        ledger.append(trade_at(monday, -30.0));
        ledger.append(trade_at(tuesday, 5.0));
        ledger.append(trade_at(tuesday, -1.0));
        // Late record for an earlier day leaves today's total alone
        ledger.append(trade_at(monday, -7.0));

        assert_eq!(ledger.pnl_on(tuesday.date_naive()), 4.0);
    }
}
