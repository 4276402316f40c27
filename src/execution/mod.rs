// Simulated execution: ledger, trade placement and the polling loop
pub mod engine;
pub mod ledger;
pub mod trader;

pub use engine::{LoopConfig, PollOutcome, RunSummary, TradingLoop};
pub use ledger::{Ledger, LedgerSnapshot, SharedLedger};
pub use trader::{ExitRules, Trader};
