// src/orchestrator.rs

use crate::analyzer::{Analyzer, AnalyzerFailure};
use crate::models::{AnalysisRequest, AnalysisResult, ErrorDetail, ErrorKind, TickerSymbol};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures that abort the whole batch. Per-symbol failures never end up here.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Analysis task for {symbol} failed: {reason}")]
    TaskFailed { symbol: String, reason: String },
    #[error("Analysis did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}

/// Map a collaborator failure onto the public error taxonomy.
pub fn classify(failure: &AnalyzerFailure) -> ErrorDetail {
    let kind = match failure {
        AnalyzerFailure::MissingCredential(_) => ErrorKind::MissingCredential,
        AnalyzerFailure::Timeout(_) | AnalyzerFailure::Connection(_) => ErrorKind::NetworkFailure,
        AnalyzerFailure::RateLimited(_)
        | AnalyzerFailure::Provider { .. }
        | AnalyzerFailure::MalformedResponse(_) => ErrorKind::ProviderError,
        AnalyzerFailure::RejectedSymbol(_) => ErrorKind::InvalidInput,
    };
    ErrorDetail {
        kind,
        message: failure.to_string(),
    }
}

// Aborts the task when dropped so an abandoned batch stops its in-flight calls
struct TaskGuard<T> {
    symbol: TickerSymbol,
    handle: JoinHandle<T>,
}

impl<T> Future for TaskGuard<T> {
    type Output = (TickerSymbol, Result<T, JoinError>);

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Ready(joined) => Poll::Ready((self.symbol.clone(), joined)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for TaskGuard<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Runs the analyzer once per symbol and collects results in request order.
#[derive(Clone)]
pub struct Orchestrator {
    analyzer: Arc<dyn Analyzer>,
    max_concurrency: usize,
    batch_timeout: Duration,
}

impl Orchestrator {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Orchestrator {
            analyzer,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_batch_timeout(mut self, batch_timeout: Duration) -> Self {
        self.batch_timeout = batch_timeout;
        self
    }

    pub async fn run(&self, request: AnalysisRequest) -> Result<Vec<AnalysisResult>, OrchestratorError> {
        let started = Instant::now();
        let count = request.len();
        info!(symbols = %request.to_query(), "analysis batch started");

        let tasks = stream::iter(request.into_symbols())
            .map(|symbol| {
                let analyzer = Arc::clone(&self.analyzer);
                let task_symbol = symbol.clone();
                TaskGuard {
                    symbol,
                    handle: tokio::spawn(analyze_symbol(analyzer, task_symbol)),
                }
            })
            .buffered(self.max_concurrency)
            .collect::<Vec<_>>();

        let joined = tokio::time::timeout(self.batch_timeout, tasks)
            .await
            .map_err(|_| {
                warn!(timeout = ?self.batch_timeout, "analysis batch deadline exceeded");
                OrchestratorError::DeadlineExceeded(self.batch_timeout)
            })?;

        let mut results = Vec::with_capacity(count);
        for (symbol, outcome) in joined {
            match outcome {
                Ok(result) => results.push(result),
                Err(err) => {
                    error!(%symbol, error = %err, "analysis task aborted");
                    return Err(OrchestratorError::TaskFailed {
                        symbol: symbol.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let failed = results.iter().filter(|r| !r.is_ok()).count();
        info!(
            symbols = count,
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis batch finished"
        );
        Ok(results)
    }
}

async fn analyze_symbol(analyzer: Arc<dyn Analyzer>, symbol: TickerSymbol) -> AnalysisResult {
    match analyzer.analyze(&symbol).await {
        Ok(data) => AnalysisResult::success(symbol, data),
        Err(failure) => {
            let detail = classify(&failure);
            warn!(%symbol, kind = ?detail.kind, message = %detail.message, "analysis failed");
            AnalysisResult::failure(symbol, detail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedAnalyzer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Analyzer for ScriptedAnalyzer {
        async fn analyze(&self, symbol: &TickerSymbol) -> Result<serde_json::Value, AnalyzerFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match symbol.as_str() {
                "BAD" => Err(AnalyzerFailure::Provider {
                    code: Some(400),
                    message: "symbol not found".to_string(),
                }),
                "BOOM" => panic!("analyzer blew up"),
                "HANG" => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(json!({}))
                }
                other => Ok(json!({ "symbol": other })),
            }
        }
    }

    fn orchestrator() -> (Orchestrator, Arc<ScriptedAnalyzer>) {
        let analyzer = Arc::new(ScriptedAnalyzer {
            calls: AtomicUsize::new(0),
        });
        (Orchestrator::new(analyzer.clone()), analyzer)
    }

    #[test]
    fn test_classify() {
        let cases = vec![
            (AnalyzerFailure::MissingCredential("no key".into()), ErrorKind::MissingCredential),
            (AnalyzerFailure::Timeout("slow".into()), ErrorKind::NetworkFailure),
            (AnalyzerFailure::Connection("refused".into()), ErrorKind::NetworkFailure),
            (AnalyzerFailure::RateLimited("credits".into()), ErrorKind::ProviderError),
            (
                AnalyzerFailure::Provider {
                    code: Some(400),
                    message: "not found".into(),
                },
                ErrorKind::ProviderError,
            ),
            (AnalyzerFailure::MalformedResponse("junk".into()), ErrorKind::ProviderError),
            (AnalyzerFailure::RejectedSymbol("AA$PL".into()), ErrorKind::InvalidInput),
        ];
        for (failure, expected) in cases {
            let detail = classify(&failure);
            assert_eq!(detail.kind, expected);
            assert_eq!(detail.message, failure.to_string());
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_batch() {
        let (orchestrator, analyzer) = orchestrator();
        let results = orchestrator.run(normalize("AAPL,BAD,MSFT").unwrap()).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 3);
        let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "BAD", "MSFT"]);
        assert!(results[0].is_ok());
        assert_eq!(results[1].error().unwrap().kind, ErrorKind::ProviderError);
        assert!(results[2].is_ok());
    }

    #[tokio::test]
    async fn test_panicking_task_fails_whole_batch() {
        let (orchestrator, _) = orchestrator();
        let err = orchestrator.run(normalize("AAPL,BOOM").unwrap()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::TaskFailed { ref symbol, .. } if symbol == "BOOM"));
    }

    #[tokio::test]
    async fn test_batch_deadline() {
        let (orchestrator, _) = orchestrator();
        let orchestrator = orchestrator.with_batch_timeout(Duration::from_millis(50));
        let err = orchestrator.run(normalize("AAPL,HANG").unwrap()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::DeadlineExceeded(_)));
    }

    #[tokio::test]
    async fn test_concurrency_limit_of_one_still_completes() {
        let (orchestrator, _) = orchestrator();
        let orchestrator = orchestrator.with_max_concurrency(0);
        let results = orchestrator.run(normalize("C,B,A").unwrap()).await.unwrap();
        let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "B", "A"]);
    }
}
