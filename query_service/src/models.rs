// src/models.rs

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// Twelve Data encodes every price and volume as a JSON string
fn string_to_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let value = s.parse::<f64>().map_err(serde::de::Error::custom)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!("non-finite price '{}'", s)));
    }
    Ok(value)
}

// Volume is missing entirely for forex and some indices
fn optional_string_to_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    match s {
        Some(s) if !s.is_empty() => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Parse a provider timestamp. Intraday intervals carry a time component,
/// daily and coarser ones carry only the date.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

// Meta block of a time_series response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesMeta {
    pub symbol: String,
    pub interval: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange_timezone: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default, rename = "type")]
    pub instrument_type: Option<String>,
}

// One bar of the series, newest first as delivered by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesValue {
    pub datetime: String,
    #[serde(deserialize_with = "string_to_f64")]
    pub open: f64,
    #[serde(deserialize_with = "string_to_f64")]
    pub high: f64,
    #[serde(deserialize_with = "string_to_f64")]
    pub low: f64,
    #[serde(deserialize_with = "string_to_f64")]
    pub close: f64,
    #[serde(default, deserialize_with = "optional_string_to_i64")]
    pub volume: Option<i64>,
}

// Successful time_series payload
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesResponse {
    pub meta: SeriesMeta,
    #[serde(default)]
    pub values: Vec<SeriesValue>,
}

// Application-level error body. Twelve Data usually answers these with HTTP 200.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
}
