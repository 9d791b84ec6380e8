// src/analysis.rs

use crate::error::QueryError;
use crate::models::{parse_timestamp, TimeSeriesResponse};
use serde::{Deserialize, Serialize};

pub const SHORT_SMA_PERIOD: usize = 5;
pub const LONG_SMA_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub datetime: String,
    pub close: f64,
}

/// Per-ticker analysis returned to API callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerAnalysis {
    pub symbol: String,
    pub interval: String,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub points: usize,
    pub first_timestamp: String,
    pub last_timestamp: String,
    pub latest_close: f64,
    pub change: f64,
    pub change_pct: f64,
    pub high: f64,
    pub low: f64,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub average_volume: Option<f64>,
    pub series: Vec<PricePoint>,
}

pub fn simple_moving_average(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

// Wilder's RSI over the trailing window; closes must be chronological
pub fn relative_strength_index(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() <= period {
        return None;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let (seed, rest) = deltas.split_at(period);

    let mut avg_gain = seed.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
    let mut avg_loss = seed.iter().filter(|d| **d < 0.0).map(|d| -d).sum::<f64>() / period as f64;

    for delta in rest {
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(if avg_gain == 0.0 { 50.0 } else { 100.0 });
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

pub fn percent_change(first: f64, last: f64) -> f64 {
    if first == 0.0 {
        return 0.0;
    }
    (last - first) / first * 100.0
}

/// Reduce a provider series into a [`TickerAnalysis`].
pub fn analyze_series(series: &TimeSeriesResponse) -> Result<TickerAnalysis, QueryError> {
    if series.values.is_empty() {
        return Err(QueryError::EmptySeries(series.meta.symbol.clone()));
    }

    // Provider delivers newest first
    let mut keyed = Vec::with_capacity(series.values.len());
    for value in &series.values {
        let ts = parse_timestamp(&value.datetime)
            .ok_or_else(|| QueryError::Decode(format!("bad datetime '{}'", value.datetime)))?;
        keyed.push((ts, value.clone()));
    }
    keyed.sort_by_key(|(ts, _)| *ts);

    let closes: Vec<f64> = keyed.iter().map(|(_, v)| v.close).collect();
    let high = keyed.iter().map(|(_, v)| v.high).fold(f64::MIN, f64::max);
    let low = keyed.iter().map(|(_, v)| v.low).fold(f64::MAX, f64::min);

    // Summed as f64; provider volumes can overflow an i64 total
    let volumes: Vec<f64> = keyed.iter().filter_map(|(_, v)| v.volume).map(|v| v as f64).collect();
    let average_volume = if volumes.is_empty() {
        None
    } else {
        Some(volumes.iter().sum::<f64>() / volumes.len() as f64)
    };

    let first_close = closes[0];
    let latest_close = closes[closes.len() - 1];

    Ok(TickerAnalysis {
        symbol: series.meta.symbol.clone(),
        interval: series.meta.interval.clone(),
        currency: series.meta.currency.clone(),
        exchange: series.meta.exchange.clone(),
        points: keyed.len(),
        first_timestamp: keyed[0].1.datetime.clone(),
        last_timestamp: keyed[keyed.len() - 1].1.datetime.clone(),
        latest_close,
        change: latest_close - first_close,
        change_pct: percent_change(first_close, latest_close),
        high,
        low,
        sma_short: simple_moving_average(&closes, SHORT_SMA_PERIOD),
        sma_long: simple_moving_average(&closes, LONG_SMA_PERIOD),
        rsi: relative_strength_index(&closes, RSI_PERIOD),
        average_volume,
        series: keyed
            .into_iter()
            .map(|(_, v)| PricePoint {
                datetime: v.datetime,
                close: v.close,
            })
            .collect(),
    })
}
