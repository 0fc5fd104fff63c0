//! Generic instrumented call wrapper
//!
//! Wraps every outbound SDK call with a span, a timer, error classification,
//! and exactly one telemetry record. The wrapped error is always returned
//! unchanged: the executor observes failures, it never owns them.

use crate::classify::{Classifier, NormalizedError};
use crate::record::{CODE_OK, OperationId, OperationRecord};
use crate::telemetry::TelemetrySink;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Instrumented executor for one provider client.
///
/// Stateless per call (timer, span, and record are all invocation-local),
/// so a single instance is safely shared across concurrent tasks.
#[derive(Clone)]
pub struct OperationExecutor {
    client: String,
    classifier: Arc<Classifier>,
    sink: Arc<dyn TelemetrySink>,
}

impl OperationExecutor {
    pub fn new(
        client: impl Into<String>,
        classifier: Arc<Classifier>,
        sink: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            client: client.into(),
            classifier,
            sink,
        }
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    /// Execute a call whose error type is declared by the callable.
    ///
    /// On failure the exact `E` value the call returned comes back to the
    /// caller; classification only reads it.
    pub async fn execute_typed<T, E, S, F, Fut>(
        &self,
        operation: OperationId,
        request: S,
        call: F,
    ) -> Result<T, E>
    where
        E: std::error::Error + Send + Sync + 'static,
        S: FnOnce() -> serde_json::Value,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(operation, None, request, call, |classifier, err| {
            classifier.classify(err)
        })
        .await
    }

    /// [`execute_typed`](Self::execute_typed) with a retry-attempt number
    /// stamped on the emitted record. The executor itself never retries;
    /// the count is supplied by the caller's retry loop.
    pub async fn execute_with_attempt<T, E, S, F, Fut>(
        &self,
        operation: OperationId,
        attempt: u32,
        request: S,
        call: F,
    ) -> Result<T, E>
    where
        E: std::error::Error + Send + Sync + 'static,
        S: FnOnce() -> serde_json::Value,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run(operation, Some(attempt), request, call, |classifier, err| {
            classifier.classify(err)
        })
        .await
    }

    /// Execute a call with an untyped (`anyhow`) error, classifying across
    /// the whole cause chain. The original report is returned unchanged.
    pub async fn execute<T, S, F, Fut>(
        &self,
        operation: OperationId,
        request: S,
        call: F,
    ) -> anyhow::Result<T>
    where
        S: FnOnce() -> serde_json::Value,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.run(operation, None, request, call, |classifier, err| {
            classifier.classify_report(err)
        })
        .await
    }

    async fn run<T, E, S, F, Fut>(
        &self,
        operation: OperationId,
        attempt: Option<u32>,
        request: S,
        call: F,
        classify: impl FnOnce(&Classifier, &E) -> NormalizedError,
    ) -> Result<T, E>
    where
        E: std::fmt::Display,
        S: FnOnce() -> serde_json::Value,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let span = tracing::debug_span!(
            "cloud_operation",
            client = %self.client,
            operation = %operation,
            code = tracing::field::Empty,
        );
        let serialized = request();
        let started = Instant::now();
        let result = call().instrument(span.clone()).await;
        let duration = started.elapsed();

        match result {
            Ok(value) => {
                span.record("code", CODE_OK);
                self.sink.emit(&OperationRecord::success(
                    operation,
                    &self.client,
                    duration,
                    serialized,
                    attempt,
                ));
                Ok(value)
            }
            Err(err) => {
                let normalized = classify(&self.classifier, &err);
                if let Some(code) = normalized.code {
                    span.record("code", code);
                }
                self.sink.emit(&OperationRecord::failure(
                    operation,
                    &self.client,
                    duration,
                    serialized,
                    normalized,
                    err.to_string(),
                    attempt,
                ));
                Err(err)
            }
        }
    }
}
