//! Read-only web dashboard over the trade ledger.
//!
//! Routes:
//! - `/` HTML summary and trade table
//! - `/historical` trades as JSON
//! - `/pnl_chart` cumulative P&L chart (SVG)
//! - `/health`

pub mod chart;
mod error;
pub mod handlers;

pub use error::PresentationError;

use axum::{routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::execution::SharedLedger;

/// State available to all handlers
#[derive(Clone)]
pub struct DashboardState {
    pub ledger: SharedLedger,
    pub instrument: String,
}

impl DashboardState {
    pub fn new(ledger: SharedLedger, instrument: impl Into<String>) -> Self {
        Self {
            ledger,
            instrument: instrument.into(),
        }
    }
}

pub fn build_router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/historical", get(handlers::historical))
        .route("/pnl_chart", get(handlers::pnl_chart))
        .route("/health", get(handlers::health))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the dashboard until `shutdown` resolves
pub async fn serve<Sd>(
    addr: SocketAddr,
    state: DashboardState,
    shutdown: Sd,
) -> Result<(), PresentationError>
where
    Sd: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| PresentationError::Bind { addr, source })?;

    tracing::info!("📊 Dashboard listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(PresentationError::Serve)
}
