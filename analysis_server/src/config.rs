// src/config.rs

use crate::orchestrator::{DEFAULT_BATCH_TIMEOUT, DEFAULT_MAX_CONCURRENCY};
use query_service::client::{DEFAULT_BASE_URL, DEFAULT_INTERVAL, DEFAULT_OUTPUTSIZE, DEFAULT_TIMEOUT};
use query_service::ClientSettings;
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_VAR: &str = "TWELVEDATA_API_KEY";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got '{value}'")]
    NotANumber { var: String, value: String },
    #[error("{0} must be greater than zero")]
    Zero(String),
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub interval: String,
    pub outputsize: u32,
    pub request_timeout: Duration,
    pub batch_timeout: Duration,
    pub max_concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            outputsize: DEFAULT_OUTPUTSIZE,
            request_timeout: DEFAULT_TIMEOUT,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |var: &str, default: String| lookup(var).filter(|v| !v.is_empty()).unwrap_or(default);

        let config = Self {
            bind_addr: text("ANALYSIS_BIND_ADDR", defaults.bind_addr),
            // An empty key counts as unset
            api_key: lookup(API_KEY_VAR).filter(|key| !key.is_empty()),
            base_url: text("TWELVEDATA_BASE_URL", defaults.base_url),
            interval: text("TWELVEDATA_INTERVAL", defaults.interval),
            outputsize: number(&lookup, "TWELVEDATA_OUTPUTSIZE", defaults.outputsize)?,
            request_timeout: Duration::from_secs(number(
                &lookup,
                "ANALYSIS_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            batch_timeout: Duration::from_secs(number(
                &lookup,
                "ANALYSIS_BATCH_TIMEOUT_SECS",
                defaults.batch_timeout.as_secs(),
            )?),
            max_concurrency: number(&lookup, "ANALYSIS_MAX_CONCURRENCY", defaults.max_concurrency)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outputsize == 0 {
            return Err(ConfigError::Zero("TWELVEDATA_OUTPUTSIZE".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Zero("ANALYSIS_REQUEST_TIMEOUT_SECS".to_string()));
        }
        if self.batch_timeout.is_zero() {
            return Err(ConfigError::Zero("ANALYSIS_BATCH_TIMEOUT_SECS".to_string()));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::Zero("ANALYSIS_MAX_CONCURRENCY".to_string()));
        }
        Ok(())
    }

    pub fn key_length(&self) -> usize {
        self.api_key.as_ref().map_or(0, |key| key.chars().count())
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            interval: self.interval.clone(),
            outputsize: self.outputsize,
            timeout: self.request_timeout,
        }
    }
}

fn number<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| ConfigError::NotANumber {
                var: var.to_string(),
                value,
            })
        }
        _ => Ok(default),
    }
}
