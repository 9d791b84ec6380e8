// src/error.rs

use crate::models::{ErrorDetail, ErrorKind, ErrorResponse, Fault};
use crate::normalizer::NormalizeError;
use crate::orchestrator::OrchestratorError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Errors a handler turns into an HTTP response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("{}", .detail.message)]
    Classified { symbol: Option<String>, detail: ErrorDetail },
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

impl ApiError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::BadRequest(_) => Some(ErrorKind::InvalidInput),
            ApiError::Normalize(err) => Some(err.kind()),
            ApiError::Classified { detail, .. } => Some(detail.kind),
            ApiError::Orchestrator(_) => None,
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind.fault() {
        Fault::Client => StatusCode::BAD_REQUEST,
        Fault::Server => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Orchestrator(OrchestratorError::DeadlineExceeded(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Orchestrator(OrchestratorError::TaskFailed { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            other => other.kind().map_or(StatusCode::INTERNAL_SERVER_ERROR, status_for),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let symbol = match self {
            ApiError::Classified { symbol, .. } => symbol.clone(),
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            kind: self.kind(),
            symbol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Normalize(NormalizeError::Empty).status_code(),
            StatusCode::BAD_REQUEST
        );

        let classified = |kind| ApiError::Classified {
            symbol: Some("AAPL".into()),
            detail: ErrorDetail {
                kind,
                message: "m".into(),
            },
        };
        assert_eq!(classified(ErrorKind::MissingCredential).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classified(ErrorKind::NetworkFailure).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(classified(ErrorKind::ProviderError).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(classified(ErrorKind::InvalidInput).status_code(), StatusCode::BAD_REQUEST);

        let deadline = ApiError::Orchestrator(OrchestratorError::DeadlineExceeded(Duration::from_secs(1)));
        assert_eq!(deadline.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(deadline.kind(), None);
    }
}
