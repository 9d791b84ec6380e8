// src/lib.rs

pub mod analysis;
pub mod client;
pub mod error;
pub mod models;

pub use analysis::{analyze_series, TickerAnalysis};
pub use client::{ClientSettings, TwelveDataClient};
pub use error::QueryError;
