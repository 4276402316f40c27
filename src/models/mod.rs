use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One close observation from the broker
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Price history for a single instrument, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub instrument: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, ordering points by timestamp.
    pub fn new(instrument: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self {
            instrument: instrument.into(),
            points,
        }
    }

    /// Closing prices in chronological order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Trading signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Direction to trade on, `None` for hold
    pub fn direction(self) -> Option<TradeDirection> {
        match self {
            Signal::Buy => Some(TradeDirection::Buy),
            Signal::Sell => Some(TradeDirection::Sell),
            Signal::Hold => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "BUY"),
            TradeDirection::Sell => write!(f, "SELL"),
        }
    }
}

/// A simulated trade. Never modified after it is recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub action: TradeDirection,
    pub size: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
}

/// Point on the cumulative P&L curve
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PnlPoint {
    pub timestamp: DateTime<Utc>,
    pub cumulative_pnl: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_series_sorted_on_construction() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 10, 1, 0).unwrap();

        let series = PriceSeries::new(
            "CS.D.DAX.FD.MAR.IP",
            vec![
                PricePoint { timestamp: t1, close: 101.0 },
                PricePoint { timestamp: t0, close: 100.0 },
            ],
        );

        assert_eq!(series.closes(), vec![100.0, 101.0]);
        assert_eq!(series.latest().unwrap().close, 101.0);
    }

    #[test]
    fn test_signal_direction() {
        assert_eq!(Signal::Buy.direction(), Some(TradeDirection::Buy));
        assert_eq!(Signal::Sell.direction(), Some(TradeDirection::Sell));
        assert_eq!(Signal::Hold.direction(), None);
    }

    #[test]
    fn test_direction_serializes_uppercase() {
        let json = serde_json::to_string(&TradeDirection::Sell).unwrap();
        assert_eq!(json, "\"SELL\"");
    }
}
