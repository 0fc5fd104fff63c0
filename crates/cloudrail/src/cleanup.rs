//! Cleanup recording
//!
//! Append-only ledger between create-type call sites and the out-of-process
//! janitor. A resource is recorded at the moment its create call is issued,
//! before the provider confirms anything, so a lost confirmation still
//! leaves a reclaimable trail.

use crate::error::{CoreError, PublishError, Result};
use crate::identity::{CleanupLedgerEntry, ClientMeta, CloudResourceIdentity};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

/// Durable enqueue seam toward the janitor.
///
/// Implementations must be safe for concurrent `publish` calls; the
/// recorder performs no locking of its own.
#[async_trait]
pub trait JanitorPublisher: Send + Sync {
    async fn publish(&self, entry: CleanupLedgerEntry) -> std::result::Result<(), PublishError>;
}

/// Process-wide cleanup ledger front end.
///
/// Forwards each identity to the publisher and retains nothing; after a
/// successful publish the external janitor owns all subsequent state.
pub struct CleanupRecorder {
    publisher: std::sync::Arc<dyn JanitorPublisher>,
}

impl CleanupRecorder {
    pub fn new(publisher: std::sync::Arc<dyn JanitorPublisher>) -> Self {
        Self { publisher }
    }

    /// Record one created resource.
    ///
    /// Call before or concurrently with issuing the underlying create call.
    /// A publish failure surfaces as [`CoreError::CleanupUnavailable`];
    /// callers decide whether that aborts the primary operation (in test
    /// contexts it usually should not, but must be logged).
    pub async fn record(&self, resource: CloudResourceIdentity, meta: ClientMeta) -> Result<()> {
        debug!(
            resource = %resource,
            client = %meta.client,
            "recording resource for cleanup"
        );
        let entry = CleanupLedgerEntry::new(resource, meta);
        self.publisher.publish(entry).await.map_err(CoreError::from)
    }
}

/// Publisher over an in-process mpsc channel.
///
/// The unbounded sender is already safe for concurrent use, so recording
/// never serializes behind a lock. The janitor transport drains the
/// receiver out of band; a closed receiver maps to a publish error.
#[derive(Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<CleanupLedgerEntry>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CleanupLedgerEntry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl JanitorPublisher for ChannelPublisher {
    async fn publish(&self, entry: CleanupLedgerEntry) -> std::result::Result<(), PublishError> {
        self.tx
            .send(entry)
            .map_err(|_| PublishError("janitor channel closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn record_publishes_exactly_one_entry() {
        let (publisher, mut rx) = ChannelPublisher::new();
        let recorder = CleanupRecorder::new(Arc::new(publisher));

        recorder
            .record(
                CloudResourceIdentity::GcsBucket {
                    bucket: "b1".into(),
                },
                ClientMeta::new("storage-client"),
            )
            .await
            .unwrap();

        let entry = rx.recv().await.unwrap();
        assert_eq!(
            entry.resource,
            CloudResourceIdentity::GcsBucket {
                bucket: "b1".into()
            }
        );
        assert_eq!(entry.meta.client, "storage-client");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_channel_surfaces_cleanup_unavailable() {
        let (publisher, rx) = ChannelPublisher::new();
        drop(rx);
        let recorder = CleanupRecorder::new(Arc::new(publisher));

        let err = recorder
            .record(
                CloudResourceIdentity::GcpProject {
                    project: "p1".into(),
                },
                ClientMeta::new("admin-client"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::CleanupUnavailable(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_records_neither_drop_nor_duplicate() {
        let (publisher, mut rx) = ChannelPublisher::new();
        let recorder = Arc::new(CleanupRecorder::new(Arc::new(publisher)));

        let mut handles = Vec::new();
        for i in 0..100 {
            let recorder = recorder.clone();
            handles.push(tokio::spawn(async move {
                recorder
                    .record(
                        CloudResourceIdentity::Ec2Instance {
                            instance_id: format!("i-{i:04}"),
                        },
                        ClientMeta::new("compute-client"),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let entry = rx.recv().await.unwrap();
            assert!(seen.insert(entry.resource));
        }
        assert_eq!(seen.len(), 100);
        assert!(rx.try_recv().is_err());
    }
}
