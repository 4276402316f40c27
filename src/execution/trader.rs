use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::SharedLedger;
use crate::api::PriceFeed;
use crate::error::BotError;
use crate::models::{TradeDirection, TradeRecord};
use crate::Result;

/// Fixed exit distances used to close simulated trades immediately
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitRules {
    pub take_profit_points: f64,
    pub stop_loss_points: f64,
}

impl Default for ExitRules {
    fn default() -> Self {
        Self {
            take_profit_points: 20.0,
            stop_loss_points: 10.0,
        }
    }
}

impl ExitRules {
    /// BUY exits at take-profit above entry, SELL at stop-loss below entry
    pub fn exit_price(&self, direction: TradeDirection, entry_price: f64) -> f64 {
        match direction {
            TradeDirection::Buy => entry_price + self.take_profit_points,
            TradeDirection::Sell => entry_price - self.stop_loss_points,
        }
    }

    /// Build the trade record for an entry at `entry_price`
    pub fn simulate(
        &self,
        symbol: &str,
        direction: TradeDirection,
        size: f64,
        entry_price: f64,
        timestamp: DateTime<Utc>,
    ) -> TradeRecord {
        let exit_price = self.exit_price(direction, entry_price);
        let pnl = match direction {
            TradeDirection::Buy => (exit_price - entry_price) * size,
            TradeDirection::Sell => (entry_price - exit_price) * size,
        };

        TradeRecord {
            id: Uuid::new_v4(),
            timestamp,
            symbol: symbol.to_string(),
            action: direction,
            size,
            entry_price,
            exit_price,
            pnl,
        }
    }
}

/// Places simulated trades and records them in the ledger
pub struct Trader<F> {
    feed: F,
    ledger: SharedLedger,
    exits: ExitRules,
}

impl<F: PriceFeed> Trader<F> {
    pub fn new(feed: F, ledger: SharedLedger, exits: ExitRules) -> Self {
        Self {
            feed,
            ledger,
            exits,
        }
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    /// Record a trade at the current price, stamped with the current time
    pub async fn record_trade(
        &self,
        symbol: &str,
        size: f64,
        direction: TradeDirection,
    ) -> Result<TradeRecord> {
        self.record_trade_at(symbol, size, direction, None).await
    }

    /// Record a trade with an explicit timestamp (for replays and tests)
    ///
    /// The entry price is the latest close from a fresh fetch. If that fetch
    /// fails the ledger is left untouched.
    pub async fn record_trade_at(
        &self,
        symbol: &str,
        size: f64,
        direction: TradeDirection,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<TradeRecord> {
        let series = self.feed.fetch_prices(symbol).await?;
        let entry_price = series
            .latest()
            .map(|p| p.close)
            .ok_or_else(|| BotError::FeedUnavailable(format!("no current price for {}", symbol)))?;

        let record = self.exits.simulate(
            symbol,
            direction,
            size,
            entry_price,
            timestamp.unwrap_or_else(Utc::now),
        );

        self.ledger.write().await.append(record.clone());

        tracing::info!(
            trade_id = %record.id,
            symbol,
            action = %direction,
            size,
            entry = record.entry_price,
            exit = record.exit_price,
            pnl = record.pnl,
            "💹 Trade placed"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Ledger;
    use crate::models::{PricePoint, PriceSeries};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Feed returning a fixed close, or failing when `price` is None
    #[derive(Clone)]
    struct FixedFeed {
        price: Option<f64>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedFeed {
        fn new(price: Option<f64>) -> Self {
            Self {
                price,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl PriceFeed for FixedFeed {
        async fn fetch_prices(&self, instrument: &str) -> Result<PriceSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.price {
                Some(close) => Ok(PriceSeries::new(
                    instrument,
                    vec![PricePoint {
                        timestamp: Utc::now(),
                        close,
                    }],
                )),
                None => Err(BotError::FeedUnavailable("HTTP 503".into())),
            }
        }
    }

    fn rules() -> ExitRules {
        ExitRules {
            take_profit_points: 20.0,
            stop_loss_points: 10.0,
        }
    }

    #[test]
    fn test_buy_exits_at_take_profit() {
        let record = rules().simulate("DAX", TradeDirection::Buy, 1.0, 100.0, Utc::now());
        assert_eq!(record.exit_price, 120.0);
        assert_eq!(record.pnl, 20.0);
    }

    #[test]
    fn test_sell_exits_at_stop_loss() {
        let record = rules().simulate("DAX", TradeDirection::Sell, 1.0, 100.0, Utc::now());
        assert_eq!(record.exit_price, 90.0);
        assert_eq!(record.pnl, 10.0);
    }

    #[test]
    fn test_pnl_scales_with_size() {
        let record = rules().simulate("DAX", TradeDirection::Buy, 2.5, 100.0, Utc::now());
        assert_eq!(record.pnl, 50.0);
    }

    #[tokio::test]
    async fn test_record_trade_appends_to_ledger() {
        let ledger = Ledger::new().into_shared();
        let feed = FixedFeed::new(Some(100.0));
        let trader = Trader::new(feed.clone(), ledger.clone(), rules());

        let record = trader
            .record_trade("DAX", 1.0, TradeDirection::Buy)
            .await
            .unwrap();

        assert_eq!(record.entry_price, 100.0);
        assert_eq!(record.symbol, "DAX");
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);

        let ledger = ledger.read().await;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.total_pnl(), 20.0);
    }

    #[tokio::test]
    async fn test_repeated_calls_create_independent_records() {
        let ledger = Ledger::new().into_shared();
        let trader = Trader::new(FixedFeed::new(Some(100.0)), ledger.clone(), rules());

        let first = trader.record_trade("DAX", 1.0, TradeDirection::Sell).await.unwrap();
        let second = trader.record_trade("DAX", 1.0, TradeDirection::Sell).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(ledger.read().await.total_pnl(), 20.0);
    }

    #[tokio::test]
    async fn test_feed_failure_leaves_ledger_untouched() {
        let ledger = Ledger::new().into_shared();
        let trader = Trader::new(FixedFeed::new(None), ledger.clone(), rules());

        let result = trader.record_trade("DAX", 1.0, TradeDirection::Buy).await;

        assert!(matches!(result, Err(BotError::FeedUnavailable(_))));
        assert!(ledger.read().await.is_empty());
    }
}
