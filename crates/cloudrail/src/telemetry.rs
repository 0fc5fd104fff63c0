//! Telemetry sink and metrics seams
//!
//! The executor emits one [`OperationRecord`] per call to a sink; metric and
//! log backends stay behind these traits. [`TracingSink`] is the production
//! default; the `Memory*` types capture emissions for tests.

use crate::record::{OperationId, OperationRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Consumes one record per completed call attempt.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, record: &OperationRecord);
}

/// Backend seam for the three per-operation metrics.
pub trait MetricsRecorder: Send + Sync {
    /// Monotonic call counter keyed by (client, operation).
    fn incr_calls(&self, client: &str, operation: OperationId);

    /// Latency distribution keyed by (client, operation).
    fn observe_latency(&self, client: &str, operation: OperationId, latency: Duration);

    /// Error counter keyed by (client, operation, normalized code).
    /// Incremented only on failure.
    fn incr_errors(&self, client: &str, operation: OperationId, code: Option<u16>);
}

/// Metrics recorder that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    fn incr_calls(&self, _client: &str, _operation: OperationId) {}
    fn observe_latency(&self, _client: &str, _operation: OperationId, _latency: Duration) {}
    fn incr_errors(&self, _client: &str, _operation: OperationId, _code: Option<u16>) {}
}

/// Default sink: structured debug log plus metric updates.
///
/// The request payload is logged as a single JSON-valued field so downstream
/// log processors can query inside it.
pub struct TracingSink {
    metrics: Arc<dyn MetricsRecorder>,
}

impl TracingSink {
    pub fn new(metrics: Arc<dyn MetricsRecorder>) -> Self {
        Self { metrics }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Arc::new(NoopMetrics))
    }
}

impl TelemetrySink for TracingSink {
    fn emit(&self, record: &OperationRecord) {
        tracing::debug!(
            client = %record.client,
            operation = %record.operation,
            duration_ms = record.duration.as_millis() as u64,
            code = record.code,
            reason = record.reason.as_deref(),
            error = record.error.as_deref(),
            attempt = record.attempt,
            request = %record.request,
            "cloud operation completed"
        );

        self.metrics.incr_calls(&record.client, record.operation);
        self.metrics
            .observe_latency(&record.client, record.operation, record.duration);
        if record.is_error() {
            self.metrics
                .incr_errors(&record.client, record.operation, record.code);
        }
    }
}

/// In-process sink capturing every record, for assertions in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<OperationRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<OperationRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

impl TelemetrySink for MemorySink {
    fn emit(&self, record: &OperationRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

/// In-process metrics capture, for assertions in tests.
#[derive(Debug, Default)]
pub struct MemoryMetrics {
    calls: Mutex<HashMap<(String, OperationId), u64>>,
    latencies: Mutex<HashMap<(String, OperationId), Vec<Duration>>>,
    errors: Mutex<HashMap<(String, OperationId, Option<u16>), u64>>,
}

impl MemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self, client: &str, operation: OperationId) -> u64 {
        *self
            .calls
            .lock()
            .unwrap()
            .get(&(client.to_string(), operation))
            .unwrap_or(&0)
    }

    pub fn latency_samples(&self, client: &str, operation: OperationId) -> usize {
        self.latencies
            .lock()
            .unwrap()
            .get(&(client.to_string(), operation))
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn errors(&self, client: &str, operation: OperationId, code: Option<u16>) -> u64 {
        *self
            .errors
            .lock()
            .unwrap()
            .get(&(client.to_string(), operation, code))
            .unwrap_or(&0)
    }
}

impl MetricsRecorder for MemoryMetrics {
    fn incr_calls(&self, client: &str, operation: OperationId) {
        *self
            .calls
            .lock()
            .unwrap()
            .entry((client.to_string(), operation))
            .or_insert(0) += 1;
    }

    fn observe_latency(&self, client: &str, operation: OperationId, latency: Duration) {
        self.latencies
            .lock()
            .unwrap()
            .entry((client.to_string(), operation))
            .or_default()
            .push(latency);
    }

    fn incr_errors(&self, client: &str, operation: OperationId, code: Option<u16>) {
        *self
            .errors
            .lock()
            .unwrap()
            .entry((client.to_string(), operation, code))
            .or_insert(0) += 1;
    }
}
