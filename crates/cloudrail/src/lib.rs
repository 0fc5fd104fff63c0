//! Cloudrail core
//!
//! Reliability substrate between application code and cloud provider SDKs.
//! Every outbound call goes through the instrumented executor; failures are
//! normalized into one status space; created resources are recorded for an
//! out-of-process janitor; asynchronous operations are awaited with bounded
//! polling.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │            provider wrappers ("cows")            │
//! │     (per-resource, supply call + serializer)     │
//! └───────┬──────────────┬───────────────┬───────────┘
//!         │              │               │
//! ┌───────▼──────┐ ┌─────▼───────┐ ┌─────▼──────┐
//! │  Operation   │ │   Cleanup   │ │   Waiter   │
//! │  Executor    │ │   Recorder  │ │ (polling)  │
//! └───────┬──────┘ └─────┬───────┘ └────────────┘
//!         │              │
//! ┌───────▼──────┐ ┌─────▼───────┐
//! │  Telemetry   │ │   Janitor   │
//! │  Sink        │ │   Publisher │
//! └──────────────┘ └─────────────┘
//! ```
//!
//! Provider-specific classifier rules and wait target sets live in the
//! `cloudrail-aws` and `cloudrail-gcp` crates.

pub mod classify;
pub mod cleanup;
pub mod error;
pub mod executor;
pub mod identity;
pub mod record;
pub mod telemetry;
pub mod wait;

// Re-exports
pub use classify::{Classifier, ClassifierRule, ExtractFn, HttpApiError, NormalizedError};
pub use cleanup::{ChannelPublisher, CleanupRecorder, JanitorPublisher};
pub use error::{CoreError, PublishError, Result};
pub use executor::OperationExecutor;
pub use identity::{CleanupLedgerEntry, ClientMeta, CloudResourceIdentity};
pub use record::{CODE_OK, OperationId, OperationRecord, Provider};
pub use telemetry::{
    MemoryMetrics, MemorySink, MetricsRecorder, NoopMetrics, TelemetrySink, TracingSink,
};
pub use wait::{Poll, WaitError, WaitSpec, wait_for, wait_for_state};
