// src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Twelve Data API key not found in environment variables.")]
    MissingApiKey,

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Request to provider timed out: {0}")]
    Timeout(String),

    #[error("Could not reach provider: {0}")]
    Connection(String),

    #[error("Provider rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Provider error{}: {message}", code_suffix(.code))]
    Provider { code: Option<u16>, message: String },

    #[error("Provider returned no data for {0}")]
    EmptySeries(String),

    #[error("Malformed provider response: {0}")]
    Decode(String),
}

fn code_suffix(code: &Option<u16>) -> String {
    code.map(|c| format!(" {}", c)).unwrap_or_default()
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QueryError::Timeout(err.to_string())
        } else if err.is_decode() {
            QueryError::Decode(err.to_string())
        } else if err.is_status() {
            QueryError::Provider {
                code: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        } else {
            // connect, request building and body transport failures
            QueryError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::Provider {
            code: Some(400),
            message: "symbol not found".to_string(),
        };
        assert_eq!(err.to_string(), "Provider error 400: symbol not found");

        let err = QueryError::Provider {
            code: None,
            message: "unexpected".to_string(),
        };
        assert_eq!(err.to_string(), "Provider error: unexpected");

        let err = QueryError::InvalidSymbol("AA$PL".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: AA$PL");
    }

    #[test]
    fn test_json_error_is_decode() {
        let err: QueryError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, QueryError::Decode(_)));
    }
}
