use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use super::{ExitRules, SharedLedger, Trader};
use crate::api::PriceFeed;
use crate::config::Settings;
use crate::models::TradeRecord;
use crate::risk::{DailyLossGuard, DailyLossTrip};
use crate::strategy::{Evaluation, Strategy};
use crate::Result;

/// Per-run parameters of the trading loop
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub instrument: String,
    pub trade_size: f64,
    pub poll_interval: Duration,
    pub exits: ExitRules,
    pub guard: DailyLossGuard,
}

impl LoopConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            instrument: settings.instrument.clone(),
            trade_size: settings.risk.trade_size,
            poll_interval: settings.polling_interval(),
            exits: ExitRules {
                take_profit_points: settings.risk.take_profit_points,
                stop_loss_points: settings.risk.stop_loss_points,
            },
            guard: DailyLossGuard::new(
                settings.risk.daily_loss_limit,
                settings.risk.enforce_daily_loss_limit,
            ),
        }
    }
}

/// What a single poll did
#[derive(Debug, Clone)]
pub enum PollOutcome {
    Traded {
        evaluation: Evaluation,
        trade: TradeRecord,
    },
    Held(Evaluation),
    Blocked {
        evaluation: Evaluation,
        trip: DailyLossTrip,
    },
}

/// Counters reported when the loop stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub polls: u64,
    pub trades: u64,
    pub failed_polls: u64,
}

/// poll → evaluate → (maybe) record → sleep, until shutdown
pub struct TradingLoop<F, S> {
    feed: F,
    strategy: S,
    trader: Trader<F>,
    config: LoopConfig,
}

impl<F, S> TradingLoop<F, S>
where
    F: PriceFeed + Clone,
    S: Strategy,
{
    pub fn new(feed: F, strategy: S, ledger: SharedLedger, config: LoopConfig) -> Self {
        let trader = Trader::new(feed.clone(), ledger, config.exits);
        Self {
            feed,
            strategy,
            trader,
            config,
        }
    }

    pub fn ledger(&self) -> &SharedLedger {
        self.trader.ledger()
    }

    /// One iteration. A feed failure returns `Err` and records nothing.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        let instrument = &self.config.instrument;
        let series = self.feed.fetch_prices(instrument).await?;
        let evaluation = self.strategy.evaluate(&series.closes());

        tracing::debug!(
            strategy = self.strategy.name(),
            points = series.len(),
            short_avg = ?evaluation.short_avg,
            long_avg = ?evaluation.long_avg,
            signal = ?evaluation.signal,
            "Evaluated crossover"
        );

        let Some(direction) = evaluation.signal.direction() else {
            return Ok(PollOutcome::Held(evaluation));
        };

        {
            let ledger = self.trader.ledger().read().await;
            if let Err(trip) = self.config.guard.check(&ledger, Utc::now()) {
                return Ok(PollOutcome::Blocked { evaluation, trip });
            }
        }

        let trade = self
            .trader
            .record_trade(instrument, self.config.trade_size, direction)
            .await?;

        Ok(PollOutcome::Traded { evaluation, trade })
    }

    /// Poll on a fixed interval until `shutdown` resolves.
    ///
    /// Shutdown is only observed between polls, so a poll in progress always
    /// finishes. Failed polls are logged and the loop carries on.
    pub async fn run<Sd>(&self, shutdown: Sd) -> RunSummary
    where
        Sd: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut summary = RunSummary::default();

        tracing::info!(
            instrument = %self.config.instrument,
            strategy = self.strategy.name(),
            interval_secs = self.config.poll_interval.as_secs(),
            "🔄 Trading loop starting"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, leaving trading loop");
                    break;
                }
                _ = ticker.tick() => {}
            }

            summary.polls += 1;

            match self.poll_once().await {
                Ok(PollOutcome::Traded { trade, .. }) => {
                    summary.trades += 1;
                    let total_pnl = self.ledger().read().await.total_pnl();
                    tracing::info!(
                        action = %trade.action,
                        pnl = trade.pnl,
                        total_pnl,
                        "Poll #{} traded",
                        summary.polls
                    );
                }
                Ok(PollOutcome::Held(_)) => {
                    tracing::debug!("Poll #{} held", summary.polls);
                }
                Ok(PollOutcome::Blocked { trip, .. }) => {
                    tracing::warn!(
                        realized_today = trip.realized_today,
                        limit = trip.limit,
                        "Poll #{} skipped: daily loss limit reached",
                        summary.polls
                    );
                }
                Err(e) => {
                    summary.failed_polls += 1;
                    tracing::error!("Poll #{} failed: {}", summary.polls, e);
                }
            }
        }

        summary
    }
}
