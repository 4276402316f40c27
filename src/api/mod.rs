pub mod ig;

pub use ig::{IgClient, Session};

use std::future::Future;

use crate::models::PriceSeries;
use crate::Result;

/// Source of price history for one instrument.
///
/// Each call is one upstream request: no caching, no retries.
pub trait PriceFeed: Send + Sync {
    fn fetch_prices(&self, instrument: &str) -> impl Future<Output = Result<PriceSeries>> + Send;
}
