// src/models.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

pub const MAX_SYMBOL_LEN: usize = 10;

/// Uppercase, trimmed ticker with no internal whitespace. Built by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerSymbol(String);

impl TickerSymbol {
    pub(crate) fn new_unchecked(symbol: String) -> Self {
        TickerSymbol(symbol)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, de-duplicated, non-empty list of symbols for one HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    symbols: Vec<TickerSymbol>,
}

impl AnalysisRequest {
    pub(crate) fn new(symbols: Vec<TickerSymbol>) -> Self {
        AnalysisRequest { symbols }
    }

    pub fn symbols(&self) -> &[TickerSymbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn into_symbols(self) -> Vec<TickerSymbol> {
        self.symbols
    }

    /// Comma-joined form, accepted again by the normalizer.
    pub fn to_query(&self) -> String {
        self.symbols
            .iter()
            .map(TickerSymbol::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    NetworkFailure,
    ProviderError,
    InvalidInput,
}

/// Which side of the transport boundary is at fault for an [`ErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Client,
    Server,
}

impl ErrorKind {
    pub fn fault(self) -> Fault {
        match self {
            ErrorKind::MissingCredential | ErrorKind::NetworkFailure => Fault::Server,
            ErrorKind::InvalidInput | ErrorKind::ProviderError => Fault::Client,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok { data: serde_json::Value },
    Error { error: ErrorDetail },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: TickerSymbol,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl AnalysisResult {
    pub fn success(symbol: TickerSymbol, data: serde_json::Value) -> Self {
        AnalysisResult {
            symbol,
            outcome: Outcome::Ok { data },
        }
    }

    pub fn failure(symbol: TickerSymbol, error: ErrorDetail) -> Self {
        AnalysisResult {
            symbol,
            outcome: Outcome::Error { error },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok { .. })
    }

    pub fn error(&self) -> Option<&ErrorDetail> {
        match &self.outcome {
            Outcome::Error { error } => Some(error),
            Outcome::Ok { .. } => None,
        }
    }
}

// Query strings

#[derive(Debug, Deserialize, Validate)]
pub struct AnalysisQuery {
    #[validate(length(min = 1, max = 512))]
    pub tickers: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub ticker: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StockQuery {
    #[validate(length(min = 1, max = 32))]
    pub symbol: String,
}

// Response bodies

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyStatus {
    pub key_loaded: bool,
    pub key_length: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fault_mapping() {
        assert_eq!(ErrorKind::MissingCredential.fault(), Fault::Server);
        assert_eq!(ErrorKind::NetworkFailure.fault(), Fault::Server);
        assert_eq!(ErrorKind::InvalidInput.fault(), Fault::Client);
        assert_eq!(ErrorKind::ProviderError.fault(), Fault::Client);
    }

    #[test]
    fn test_result_serialization_shape() {
        let ok = AnalysisResult::success(
            TickerSymbol::new_unchecked("AAPL".to_string()),
            json!({"latest_close": 1.0}),
        );
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"symbol": "AAPL", "status": "ok", "data": {"latest_close": 1.0}})
        );

        let failed = AnalysisResult::failure(
            TickerSymbol::new_unchecked("ZZZZ".to_string()),
            ErrorDetail {
                kind: ErrorKind::ProviderError,
                message: "symbol not found".to_string(),
            },
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({
                "symbol": "ZZZZ",
                "status": "error",
                "error": {"kind": "provider_error", "message": "symbol not found"}
            })
        );
    }

    #[test]
    fn test_result_roundtrip_through_json() {
        let raw = json!({
            "symbol": "MSFT",
            "status": "error",
            "error": {"kind": "network_failure", "message": "timed out"}
        });
        let parsed: AnalysisResult = serde_json::from_value(raw).unwrap();
        assert!(!parsed.is_ok());
        assert_eq!(parsed.error().unwrap().kind, ErrorKind::NetworkFailure);
    }

    #[test]
    fn test_query_validation() {
        let query = AnalysisQuery {
            tickers: Some(String::new()),
            ticker: None,
        };
        assert!(query.validate().is_err());

        let query = AnalysisQuery {
            tickers: Some("AAPL,MSFT".to_string()),
            ticker: None,
        };
        assert!(query.validate().is_ok());
    }
}
