//! Run settings.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. a TOML file (`config/scalper.toml` unless given on the command line)
//! 3. environment variables prefixed `SCALPER_`, nested with `__`
//!    (e.g. `SCALPER_STRATEGY__SHORT_WINDOW=8`)
//!
//! Broker credentials are read separately from `IG_API_KEY`, `IG_USERNAME`
//! and `IG_PASSWORD`.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::BotError;
use crate::strategy::CrossoverConfig;
use crate::Result;

pub const DEFAULT_CONFIG_PATH: &str = "config/scalper";
pub const DEFAULT_BASE_URL: &str = "https://demo-api.ig.com/gateway/deal";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// IG epic of the traded instrument
    pub instrument: String,
    pub strategy: CrossoverConfig,
    pub risk: RiskSettings,
    pub polling_interval_secs: u64,
    /// Keep only the most recent N trades; unbounded when unset
    #[serde(default)]
    pub ledger_capacity: Option<usize>,
    pub broker: BrokerSettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiskSettings {
    /// Configured for reporting; trades are fixed-size
    pub risk_percentage: f64,
    pub stop_loss_points: f64,
    pub take_profit_points: f64,
    pub daily_loss_limit: f64,
    pub enforce_daily_loss_limit: bool,
    pub trade_size: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardSettings {
    pub enabled: bool,
    pub bind_address: SocketAddr,
}

impl Settings {
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.instrument.trim().is_empty() {
            return Err(BotError::InvalidConfig("instrument must not be empty".into()));
        }
        if self.strategy.short_window == 0 || self.strategy.long_window == 0 {
            return Err(BotError::InvalidConfig(
                "moving average windows must be greater than 0".into(),
            ));
        }
        if self.strategy.short_window >= self.strategy.long_window {
            return Err(BotError::InvalidConfig(format!(
                "short window ({}) must be less than long window ({})",
                self.strategy.short_window, self.strategy.long_window
            )));
        }
        if self.risk.stop_loss_points < 0.0 || self.risk.take_profit_points < 0.0 {
            return Err(BotError::InvalidConfig(
                "stop-loss and take-profit points must not be negative".into(),
            ));
        }
        if self.risk.daily_loss_limit < 0.0 {
            return Err(BotError::InvalidConfig(
                "daily loss limit must not be negative".into(),
            ));
        }
        if self.risk.trade_size <= 0.0 {
            return Err(BotError::InvalidConfig("trade size must be positive".into()));
        }
        if self.polling_interval_secs == 0 {
            return Err(BotError::InvalidConfig(
                "polling interval must be at least 1 second".into(),
            ));
        }
        if self.ledger_capacity == Some(0) {
            return Err(BotError::InvalidConfig(
                "ledger capacity must be greater than 0 when set".into(),
            ));
        }
        Ok(())
    }
}

/// Load settings from defaults, an optional file and the environment.
///
/// `path` is a file stem or path understood by the `config` crate. When no
/// path is given the default file is optional; an explicit path must exist.
pub fn load_settings(path: Option<&str>) -> Result<Settings> {
    let file = match path {
        Some(p) => File::with_name(p).required(true),
        None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
    };

    let settings: Settings = with_defaults()?
        .add_source(file)
        .add_source(
            Environment::with_prefix("SCALPER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    settings.validate()?;
    Ok(settings)
}

fn with_defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let builder = Config::builder()
        .set_default("instrument", "CS.D.DAX.FD.MAR.IP")?
        .set_default("strategy.short_window", 5_i64)?
        .set_default("strategy.long_window", 20_i64)?
        .set_default("risk.risk_percentage", 1.0)?
        .set_default("risk.stop_loss_points", 10.0)?
        .set_default("risk.take_profit_points", 20.0)?
        .set_default("risk.daily_loss_limit", 5.0)?
        .set_default("risk.enforce_daily_loss_limit", false)?
        .set_default("risk.trade_size", 1.0)?
        .set_default("polling_interval_secs", 10_i64)?
        .set_default("broker.base_url", DEFAULT_BASE_URL)?
        .set_default("dashboard.enabled", true)?
        .set_default("dashboard.bind_address", "127.0.0.1:5000")?;
    Ok(builder)
}

/// Login for the broker session endpoint
#[derive(Clone)]
pub struct BrokerCredentials {
    pub api_key: String,
    pub identifier: String,
    pub password: String,
}

impl BrokerCredentials {
    pub fn new(
        api_key: impl Into<String>,
        identifier: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    /// Read `IG_API_KEY`, `IG_USERNAME` and `IG_PASSWORD`
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: required_env("IG_API_KEY")?,
            identifier: required_env("IG_USERNAME")?,
            password: required_env("IG_PASSWORD")?,
        })
    }
}

impl std::fmt::Debug for BrokerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerCredentials")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

fn required_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| BotError::InvalidConfig(format!("{} not set", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_settings() -> Settings {
        with_defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = default_settings();

        assert_eq!(settings.instrument, "CS.D.DAX.FD.MAR.IP");
        assert_eq!(settings.strategy.short_window, 5);
        assert_eq!(settings.strategy.long_window, 20);
        assert_eq!(settings.risk.stop_loss_points, 10.0);
        assert_eq!(settings.risk.take_profit_points, 20.0);
        assert_eq!(settings.risk.daily_loss_limit, 5.0);
        assert!(!settings.risk.enforce_daily_loss_limit);
        assert_eq!(settings.polling_interval(), Duration::from_secs(10));
        assert_eq!(settings.ledger_capacity, None);
        assert_eq!(settings.broker.base_url, DEFAULT_BASE_URL);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_windows() {
        let mut settings = default_settings();
        settings.strategy.short_window = 20;
        settings.strategy.long_window = 5;

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("short window"));
    }

    #[test]
    fn test_rejects_zero_polling_interval() {
        let mut settings = default_settings();
        settings.polling_interval_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_ledger_capacity() {
        let mut settings = default_settings();
        settings.ledger_capacity = Some(0);
        assert!(settings.validate().is_err());

        settings.ledger_capacity = Some(100);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = load_settings(Some("config/does-not-exist"));
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn test_credentials_debug_hides_secrets() {
        let creds = BrokerCredentials::new("key-123", "trader", "hunter2");
        let debug = format!("{:?}", creds);

        assert!(debug.contains("trader"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("key-123"));
    }
}
