//! End-to-end create-path scenarios: cleanup recording, instrumented
//! execution, and error propagation working together the way a provider
//! wrapper drives them.

use cloudrail::{
    ChannelPublisher, Classifier, CleanupRecorder, ClientMeta, CloudResourceIdentity,
    MemoryMetrics, MemorySink, OperationExecutor, OperationId, TracingSink,
};
use cloudrail_gcp::GoogleApiError;
use std::sync::Arc;

fn google_executor(sink: Arc<MemorySink>) -> OperationExecutor {
    OperationExecutor::new(
        "storage-client",
        Arc::new(Classifier::with_rules(cloudrail_gcp::rules())),
        sink,
    )
}

/// A create-bucket wrapper records the identity first, then issues the
/// call. When the call fails with a conflict, the cleanup entry is already
/// published, the record carries 409, and the original error reaches the
/// caller untouched.
#[tokio::test]
async fn failed_bucket_create_still_tracks_cleanup() {
    let (publisher, mut rx) = ChannelPublisher::new();
    let recorder = CleanupRecorder::new(Arc::new(publisher));
    let sink = Arc::new(MemorySink::new());
    let executor = google_executor(sink.clone());

    recorder
        .record(
            CloudResourceIdentity::GcsBucket {
                bucket: "b1".into(),
            },
            ClientMeta::new("storage-client"),
        )
        .await
        .unwrap();

    let err = executor
        .execute_typed(
            OperationId::GoogleCreateBucket,
            || serde_json::json!({"bucket": "b1"}),
            || async {
                Err::<(), _>(GoogleApiError::new(
                    409,
                    "ALREADY_EXISTS",
                    "bucket b1 already exists",
                ))
            },
        )
        .await
        .unwrap_err();

    // The original error, not a substitute.
    assert_eq!(err.code, 409);
    assert_eq!(err.status, "ALREADY_EXISTS");

    // Exactly one ledger entry for b1.
    let entry = rx.recv().await.unwrap();
    assert_eq!(
        entry.resource,
        CloudResourceIdentity::GcsBucket {
            bucket: "b1".into()
        }
    );
    assert!(rx.try_recv().is_err());

    // Exactly one record, classified 409.
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].code, Some(409));
    assert_eq!(records[0].operation, OperationId::GoogleCreateBucket);
}

#[tokio::test]
async fn successful_create_increments_each_success_metric_once() {
    let metrics = Arc::new(MemoryMetrics::new());
    let executor = OperationExecutor::new(
        "storage-client",
        Arc::new(Classifier::with_rules(cloudrail_gcp::rules())),
        Arc::new(TracingSink::new(metrics.clone())),
    );

    executor
        .execute_typed(
            OperationId::GoogleCreateBucket,
            || serde_json::json!({"bucket": "b2"}),
            || async { Ok::<_, GoogleApiError>("b2".to_string()) },
        )
        .await
        .unwrap();

    let op = OperationId::GoogleCreateBucket;
    assert_eq!(metrics.calls("storage-client", op), 1);
    assert_eq!(metrics.latency_samples("storage-client", op), 1);
    assert_eq!(metrics.errors("storage-client", op, Some(409)), 0);
    assert_eq!(metrics.errors("storage-client", op, None), 0);
}

#[tokio::test]
async fn grpc_failure_normalizes_across_provider_families() {
    let sink = Arc::new(MemorySink::new());
    let executor = google_executor(sink.clone());

    let result: anyhow::Result<()> = executor
        .execute(
            OperationId::GoogleCreateDataset,
            || serde_json::json!({"project": "p", "dataset": "d"}),
            || async { Err(anyhow::Error::new(tonic::Status::already_exists("dataset d"))) },
        )
        .await;

    assert!(result.is_err());
    assert_eq!(sink.records()[0].code, Some(409));
}
