use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::PriceFeed;
use crate::config::BrokerCredentials;
use crate::error::BotError;
use crate::models::{PricePoint, PriceSeries};
use crate::Result;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the IG REST trading gateway
///
/// Holds the session obtained from [`IgClient::authenticate`] and attaches it
/// to every market data request. Cloning shares the underlying connection
/// pool.
#[derive(Clone)]
pub struct IgClient {
    client: Client,
    base_url: String,
    api_key: String,
    session: Option<Session>,
}

/// Authenticated session returned by `POST /session`
#[derive(Clone)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub account_id: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token_type", &self.token_type)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

// ============== Response Types ==============

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    oauth_token: Option<OauthToken>,
    #[serde(default)]
    account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OauthToken {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketPricesResponse {
    prices: Vec<RawPrice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrice {
    #[serde(rename = "snapshotTimeUTC", default)]
    snapshot_time_utc: Option<String>,
    #[serde(default)]
    snapshot_time: Option<String>,
    close_price: RawQuote,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    #[serde(default)]
    bid: Option<f64>,
    #[serde(default)]
    ask: Option<f64>,
    #[serde(default)]
    last_traded: Option<f64>,
}

impl RawQuote {
    /// Last traded price, else bid/ask mid, else whichever side exists
    fn close(&self) -> Option<f64> {
        if let Some(last) = self.last_traded {
            return Some(last);
        }
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
            (Some(bid), None) => Some(bid),
            (None, Some(ask)) => Some(ask),
            (None, None) => None,
        }
    }
}

impl RawPrice {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        if let Some(ts) = &self.snapshot_time_utc {
            if let Ok(naive) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S") {
                return Some(naive.and_utc());
            }
        }
        let ts = self.snapshot_time.as_ref()?;
        NaiveDateTime::parse_from_str(ts, "%Y/%m/%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

fn convert_prices(instrument: &str, raw: Vec<RawPrice>) -> PriceSeries {
    let received = raw.len();
    let points: Vec<PricePoint> = raw
        .into_iter()
        .filter_map(|p| {
            Some(PricePoint {
                timestamp: p.timestamp()?,
                close: p.close_price.close()?,
            })
        })
        .collect();

    if points.len() < received {
        tracing::debug!(
            instrument,
            received,
            kept = points.len(),
            "Dropped price points without timestamp or close"
        );
    }

    PriceSeries::new(instrument, points)
}

// ============== Implementation ==============

impl IgClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BotError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            session: None,
        })
    }

    /// Build a client and open a session in one step
    pub async fn connect(base_url: impl Into<String>, credentials: &BrokerCredentials) -> Result<Self> {
        let mut client = Self::new(base_url, credentials.api_key.clone())?;
        client
            .authenticate(&credentials.identifier, &credentials.password)
            .await?;
        Ok(client)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Open a session
    /// Endpoint: POST /session
    pub async fn authenticate(&mut self, identifier: &str, password: &str) -> Result<Session> {
        let url = format!("{}/session", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("X-IG-API-KEY", &self.api_key)
            .header("Version", "3")
            .json(&SessionRequest {
                identifier,
                password,
            })
            .send()
            .await
            .map_err(|e| BotError::AuthenticationFailed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::AuthenticationFailed(format!(
                "IG API error ({}): {}",
                status, body
            )));
        }

        let body: SessionResponse = response
            .json()
            .await
            .map_err(|e| BotError::AuthenticationFailed(format!("unreadable response: {}", e)))?;

        let token = body.oauth_token.ok_or_else(|| {
            BotError::AuthenticationFailed("response did not contain an oauthToken".into())
        })?;

        let session = Session {
            access_token: token.access_token,
            token_type: token.token_type.unwrap_or_else(|| "Bearer".to_string()),
            account_id: body.account_id,
        };

        tracing::info!(account_id = ?session.account_id, "IG session established");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Fetch recent prices for an epic
    /// Endpoint: GET /markets/{epic}
    pub async fn get_prices(&self, epic: &str) -> Result<PriceSeries> {
        let url = format!("{}/markets/{}", self.base_url, epic);

        let mut request = self.client.get(&url).header("X-IG-API-KEY", &self.api_key);
        if let Some(session) = &self.session {
            request = request.header(
                "Authorization",
                format!("{} {}", session.token_type, session.access_token),
            );
            if let Some(account_id) = &session.account_id {
                request = request.header("IG-ACCOUNT-ID", account_id);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| BotError::FeedUnavailable(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::FeedUnavailable(format!(
                "IG API error ({}): {}",
                status, body
            )));
        }

        let body: MarketPricesResponse = response
            .json()
            .await
            .map_err(|e| BotError::FeedUnavailable(format!("unreadable price data: {}", e)))?;

        let series = convert_prices(epic, body.prices);
        if series.is_empty() {
            return Err(BotError::FeedUnavailable(format!(
                "no prices returned for {}",
                epic
            )));
        }

        tracing::debug!(epic, points = series.len(), "Fetched price series");
        Ok(series)
    }
}

impl PriceFeed for IgClient {
    async fn fetch_prices(&self, instrument: &str) -> Result<PriceSeries> {
        self.get_prices(instrument).await
    }
}
