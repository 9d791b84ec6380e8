// src/analyzer.rs

use crate::models::TickerSymbol;
use async_trait::async_trait;
use query_service::{analyze_series, QueryError, TwelveDataClient};
use thiserror::Error;
use tracing::debug;

/// What went wrong inside an [`Analyzer`] call, as reported by the collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalyzerFailure {
    #[error("{0}")]
    MissingCredential(String),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Connection(String),
    #[error("{0}")]
    RateLimited(String),
    #[error("{message}")]
    Provider { code: Option<u16>, message: String },
    #[error("{0}")]
    MalformedResponse(String),
    #[error("{0}")]
    RejectedSymbol(String),
}

/// Fetches provider data for one symbol and reduces it to a JSON payload.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, symbol: &TickerSymbol) -> Result<serde_json::Value, AnalyzerFailure>;
}

impl From<QueryError> for AnalyzerFailure {
    fn from(err: QueryError) -> Self {
        let message = err.to_string();
        match err {
            QueryError::MissingApiKey => AnalyzerFailure::MissingCredential(message),
            QueryError::InvalidSymbol(_) => AnalyzerFailure::RejectedSymbol(message),
            QueryError::Timeout(_) => AnalyzerFailure::Timeout(message),
            QueryError::Connection(_) => AnalyzerFailure::Connection(message),
            QueryError::RateLimited(_) => AnalyzerFailure::RateLimited(message),
            QueryError::Provider { code, .. } => AnalyzerFailure::Provider { code, message },
            QueryError::EmptySeries(_) => AnalyzerFailure::Provider {
                code: None,
                message,
            },
            QueryError::Decode(_) => AnalyzerFailure::MalformedResponse(message),
        }
    }
}

/// Production [`Analyzer`] backed by Twelve Data.
pub struct TwelveDataAnalyzer {
    client: TwelveDataClient,
}

impl TwelveDataAnalyzer {
    pub fn new(client: TwelveDataClient) -> Self {
        TwelveDataAnalyzer { client }
    }
}

#[async_trait]
impl Analyzer for TwelveDataAnalyzer {
    async fn analyze(&self, symbol: &TickerSymbol) -> Result<serde_json::Value, AnalyzerFailure> {
        let series = self.client.fetch_time_series(symbol.as_str()).await?;
        let analysis = analyze_series(&series)?;
        debug!(%symbol, points = analysis.points, "analysis computed");
        serde_json::to_value(&analysis).map_err(|e| AnalyzerFailure::MalformedResponse(e.to_string()))
    }
}
