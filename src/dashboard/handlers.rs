//! HTTP request handlers. All of them read a ledger snapshot; none mutate.

use askama::Template;
use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Json,
};

use super::chart::render_pnl_chart;
use super::{DashboardState, PresentationError};
use crate::execution::LedgerSnapshot;
use crate::models::TradeRecord;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub instrument: String,
    pub total_pnl: String,
    pub trade_count: usize,
    pub trades: Vec<TradeRow>,
}

pub struct TradeRow {
    pub timestamp: String,
    pub symbol: String,
    pub action: String,
    pub entry_price: String,
    pub exit_price: String,
    pub pnl: String,
    pub is_loss: bool,
}

impl From<&TradeRecord> for TradeRow {
    fn from(trade: &TradeRecord) -> Self {
        Self {
            timestamp: trade.timestamp.format(TIME_FORMAT).to_string(),
            symbol: trade.symbol.clone(),
            action: trade.action.to_string(),
            entry_price: format!("{:.2}", trade.entry_price),
            exit_price: format!("{:.2}", trade.exit_price),
            pnl: format!("{:.2}", trade.pnl),
            is_loss: trade.pnl < 0.0,
        }
    }
}

impl DashboardTemplate {
    /// Newest trade first
    pub fn from_snapshot(instrument: &str, snapshot: &LedgerSnapshot) -> Self {
        Self {
            instrument: instrument.to_string(),
            total_pnl: format!("{:.2}", snapshot.total_pnl),
            trade_count: snapshot.trades.len(),
            trades: snapshot.trades.iter().rev().map(TradeRow::from).collect(),
        }
    }
}

pub async fn dashboard(
    State(state): State<DashboardState>,
) -> Result<Html<String>, PresentationError> {
    let snapshot = state.ledger.read().await.snapshot();
    let template = DashboardTemplate::from_snapshot(&state.instrument, &snapshot);
    Ok(Html(template.render()?))
}

/// All recorded trades as JSON, oldest first
pub async fn historical(State(state): State<DashboardState>) -> Json<Vec<TradeRecord>> {
    let snapshot = state.ledger.read().await.snapshot();
    Json(snapshot.trades)
}

pub async fn pnl_chart(State(state): State<DashboardState>) -> impl IntoResponse {
    let points = state.ledger.read().await.cumulative_pnl();
    (
        [(header::CONTENT_TYPE, "image/svg+xml")],
        render_pnl_chart(&points),
    )
}

pub async fn health() -> &'static str {
    "OK"
}
