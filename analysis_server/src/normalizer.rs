// src/normalizer.rs

use crate::models::{AnalysisRequest, ErrorKind, TickerSymbol, MAX_SYMBOL_LEN};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("No ticker symbols provided")]
    Empty,
    #[error("Ticker symbol '{symbol}' is longer than {max} characters")]
    SymbolTooLong { symbol: String, max: usize },
    #[error("Ticker symbol '{0}' contains whitespace")]
    EmbeddedWhitespace(String),
}

impl NormalizeError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

/// Split a comma-separated ticker list into an [`AnalysisRequest`].
///
/// Parts are trimmed and uppercased, blanks dropped, and duplicates removed
/// keeping the first occurrence.
pub fn normalize(raw: &str) -> Result<AnalysisRequest, NormalizeError> {
    let mut seen = HashSet::new();
    let mut symbols = Vec::new();

    for part in raw.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }

        let symbol = trimmed.to_uppercase();
        if symbol.chars().any(char::is_whitespace) {
            return Err(NormalizeError::EmbeddedWhitespace(symbol));
        }
        if symbol.chars().count() > MAX_SYMBOL_LEN {
            return Err(NormalizeError::SymbolTooLong {
                symbol,
                max: MAX_SYMBOL_LEN,
            });
        }

        if seen.insert(symbol.clone()) {
            symbols.push(TickerSymbol::new_unchecked(symbol));
        }
    }

    if symbols.is_empty() {
        return Err(NormalizeError::Empty);
    }
    Ok(AnalysisRequest::new(symbols))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(raw: &str) -> Vec<String> {
        normalize(raw)
            .unwrap()
            .symbols()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_trim_uppercase_dedup() {
        assert_eq!(symbols("AAPL, aapl ,MSFT"), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_preserves_first_seen_order() {
        assert_eq!(symbols("msft,aapl,MSFT,goog"), vec!["MSFT", "AAPL", "GOOG"]);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(normalize(""), Err(NormalizeError::Empty));
        assert_eq!(normalize(" , , "), Err(NormalizeError::Empty));
        assert_eq!(normalize("   "), Err(NormalizeError::Empty));
        assert_eq!(normalize("").unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_blank_parts_skipped() {
        assert_eq!(symbols(",,tsla,, ,"), vec!["TSLA"]);
    }

    #[test]
    fn test_symbol_invariants() {
        assert!(matches!(
            normalize("AAPL,ABCDEFGHIJK"),
            Err(NormalizeError::SymbolTooLong { .. })
        ));
        assert!(matches!(
            normalize("BRK B"),
            Err(NormalizeError::EmbeddedWhitespace(_))
        ));
        // exactly at the limit is fine
        assert_eq!(symbols("abcdefghij"), vec!["ABCDEFGHIJ"]);
    }

    #[test]
    fn test_idempotent() {
        for raw in ["AAPL, aapl ,MSFT", " goog,,Goog, brk.b ", "x"] {
            let first = normalize(raw).unwrap();
            let second = normalize(&first.to_query()).unwrap();
            assert_eq!(first, second);
        }
    }
}
