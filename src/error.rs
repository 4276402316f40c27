use thiserror::Error;

/// Failures on the trading path.
///
/// Presentation failures live in [`crate::dashboard::PresentationError`] so
/// they can never stop the loop.
#[derive(Error, Debug)]
pub enum BotError {
    /// Session could not be opened. Fatal at startup.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A single price request failed. The loop logs it and polls again.
    #[error("price feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BotError {
    pub fn is_feed_unavailable(&self) -> bool {
        matches!(self, BotError::FeedUnavailable(_))
    }
}
