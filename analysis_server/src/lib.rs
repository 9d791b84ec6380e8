// src/lib.rs

pub mod analyzer;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod orchestrator;

use crate::analyzer::{Analyzer, TwelveDataAnalyzer};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::orchestrator::Orchestrator;
use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use query_service::{QueryError, TwelveDataClient};
use std::sync::Arc;
use tracing::info;

/// Shared per-worker state handed to every handler.
pub struct AppState {
    pub config: AppConfig,
    pub orchestrator: Orchestrator,
    pub client: TwelveDataClient,
}

impl AppState {
    /// State backed by Twelve Data for both analysis and the raw passthrough.
    pub fn from_config(config: AppConfig) -> Result<Self, QueryError> {
        let client = TwelveDataClient::new(config.client_settings())?;
        let analyzer = Arc::new(TwelveDataAnalyzer::new(client.clone()));
        Ok(Self::with_analyzer(config, analyzer, client))
    }

    pub fn with_analyzer(config: AppConfig, analyzer: Arc<dyn Analyzer>, client: TwelveDataClient) -> Self {
        let orchestrator = Orchestrator::new(analyzer)
            .with_max_concurrency(config.max_concurrency)
            .with_batch_timeout(config.batch_timeout);
        AppState {
            config,
            orchestrator,
            client,
        }
    }
}

/// Route table and extractor settings shared by the server and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .service(handlers::root)
    .service(handlers::health_check)
    .service(handlers::check_key)
    .service(handlers::analysis)
    .service(handlers::stock);
}

// Browser front-ends on any origin call this API, preflight included
pub fn cors() -> Cors {
    Cors::permissive()
}

pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let state = AppState::from_config(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(state);

    info!(%bind_addr, key_loaded = state.config.api_key.is_some(), "starting analysis server");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
