// src/handlers.rs

use crate::analyzer::AnalyzerFailure;
use crate::error::ApiError;
use crate::models::{
    AnalysisQuery, HealthResponse, KeyStatus, Outcome, RootResponse, StockQuery,
};
use crate::normalizer::normalize;
use crate::orchestrator::classify;
use crate::AppState;
use actix_web::{get, web, HttpResponse, Responder};
use tracing::info;
use validator::Validate;

#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(RootResponse {
        message: "Stock Analysis API is running".to_string(),
    })
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

// Reports whether the provider key was loaded, never the key itself
#[get("/check_key")]
pub async fn check_key(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(KeyStatus {
        key_loaded: state.config.api_key.is_some(),
        key_length: state.config.key_length(),
    })
}

/// `?tickers=A,B` answers with one result per symbol; `?ticker=A` answers with a
/// single result, or a 400/500 error depending on who is at fault.
#[get("/analysis")]
pub async fn analysis(
    state: web::Data<AppState>,
    query: web::Query<AnalysisQuery>,
) -> Result<HttpResponse, ApiError> {
    query
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let query = query.into_inner();

    if let Some(ticker) = query.ticker {
        let request = normalize(&ticker)?;
        if request.len() != 1 {
            return Err(ApiError::BadRequest(format!(
                "Expected exactly one ticker symbol, got {}",
                request.len()
            )));
        }

        let results = state.orchestrator.run(request).await?;
        return match results.into_iter().next() {
            Some(result) => match result.outcome {
                Outcome::Ok { .. } => Ok(HttpResponse::Ok().json(result)),
                Outcome::Error { error } => Err(ApiError::Classified {
                    symbol: Some(result.symbol.to_string()),
                    detail: error,
                }),
            },
            None => Err(ApiError::BadRequest("No ticker symbol provided".to_string())),
        };
    }

    let raw = query.tickers.ok_or_else(|| {
        ApiError::BadRequest("Query parameter 'tickers' or 'ticker' is required".to_string())
    })?;
    let request = normalize(&raw)?;
    let results = state.orchestrator.run(request).await?;
    Ok(HttpResponse::Ok().json(results))
}

/// Raw provider passthrough for one symbol.
#[get("/stock")]
pub async fn stock(
    state: web::Data<AppState>,
    query: web::Query<StockQuery>,
) -> Result<HttpResponse, ApiError> {
    query
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let symbol = query.symbol.trim().to_uppercase();
    info!(%symbol, "raw time series requested");

    match state.client.fetch_raw(&symbol).await {
        Ok(body) => Ok(HttpResponse::Ok().json(body)),
        Err(err) => Err(ApiError::Classified {
            symbol: Some(symbol),
            detail: classify(&AnalyzerFailure::from(err)),
        }),
    }
}
