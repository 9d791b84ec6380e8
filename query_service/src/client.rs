// src/client.rs

use crate::error::QueryError;
use crate::models::{ProviderErrorBody, TimeSeriesResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.twelvedata.com";
pub const DEFAULT_INTERVAL: &str = "1min";
pub const DEFAULT_OUTPUTSIZE: u32 = 30;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_SYMBOL_LEN: usize = 10;
const RATE_LIMIT_CODE: u16 = 429;

/// Settings for [`TwelveDataClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    /// `None` (or an empty key) makes every fetch fail before touching the network.
    pub api_key: Option<String>,
    pub interval: String,
    pub outputsize: u32,
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            interval: DEFAULT_INTERVAL.to_string(),
            outputsize: DEFAULT_OUTPUTSIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the Twelve Data `time_series` endpoint.
#[derive(Debug, Clone)]
pub struct TwelveDataClient {
    client: Client,
    settings: ClientSettings,
}

impl TwelveDataClient {
    pub fn new(settings: ClientSettings) -> Result<Self, QueryError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn api_key(&self) -> Result<&str, QueryError> {
        match self.settings.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(QueryError::MissingApiKey),
        }
    }

    /// Fetch and decode the time series for `symbol`.
    pub async fn fetch_time_series(&self, symbol: &str) -> Result<TimeSeriesResponse, QueryError> {
        let body = self.fetch_raw(symbol).await?;
        let series: TimeSeriesResponse = serde_json::from_value(body)?;
        if series.values.is_empty() {
            return Err(QueryError::EmptySeries(symbol.to_string()));
        }
        Ok(series)
    }

    /// Fetch the undecoded `time_series` body. Provider-level errors are
    /// still surfaced as [`QueryError`] so callers never see an error body.
    pub async fn fetch_raw(&self, symbol: &str) -> Result<serde_json::Value, QueryError> {
        // Both checks run before any request is built
        let api_key = self.api_key()?;
        validate_symbol(symbol)?;

        let url = format!("{}/time_series", self.settings.base_url.trim_end_matches('/'));
        let outputsize = self.settings.outputsize.to_string();
        let params = [
            ("symbol", symbol),
            ("interval", self.settings.interval.as_str()),
            ("outputsize", outputsize.as_str()),
            ("apikey", api_key),
        ];

        debug!(symbol, interval = %self.settings.interval, "requesting time series");
        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            // Error bodies are JSON when the provider itself rejected the call
            let message = match response.json::<ProviderErrorBody>().await {
                Ok(body) if !body.message.is_empty() => body.message,
                _ => status.canonical_reason().unwrap_or("unknown status").to_string(),
            };
            return Err(provider_error(Some(status.as_u16()), message));
        }

        let body: serde_json::Value = response.json().await?;
        if body.get("status").and_then(|s| s.as_str()) == Some("error") {
            let error: ProviderErrorBody = serde_json::from_value(body)?;
            return Err(provider_error(error.code, error.message));
        }

        Ok(body)
    }
}

fn provider_error(code: Option<u16>, message: String) -> QueryError {
    if code == Some(RATE_LIMIT_CODE) {
        QueryError::RateLimited(message)
    } else {
        QueryError::Provider { code, message }
    }
}

/// Reject symbols the provider could never resolve.
pub fn validate_symbol(symbol: &str) -> Result<(), QueryError> {
    let valid_chars = symbol
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '/' | ':'));

    if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN || !valid_chars {
        return Err(QueryError::InvalidSymbol(symbol.to_string()));
    }
    Ok(())
}
