//! Failures on the read-only reporting path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PresentationError {
    #[error("failed to render dashboard: {0}")]
    Render(#[from] askama::Error),

    #[error("failed to bind dashboard on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("dashboard server stopped: {0}")]
    Serve(#[source] std::io::Error),
}

impl IntoResponse for PresentationError {
    fn into_response(self) -> Response {
        tracing::error!("Dashboard request failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
