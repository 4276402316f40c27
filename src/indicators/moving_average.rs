/// Calculate Simple Moving Average (SMA) over the trailing `period` prices
///
/// Returns `None` when there are fewer than `period` prices or `period` is 0.
pub fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let sum: f64 = prices.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// Short and long SMA over the same price history
pub fn calculate_sma_pair(
    prices: &[f64],
    short_period: usize,
    long_period: usize,
) -> Option<(f64, f64)> {
    let short = calculate_sma(prices, short_period)?;
    let long = calculate_sma(prices, long_period)?;
    Some((short, long))
}
