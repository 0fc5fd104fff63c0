//! Cloud resource identity model
//!
//! One comparable unit for every resource shape the janitor can reclaim.
//! Equality and serialization are structural over the populated variant, so
//! an identity is usable directly as a de-duplication key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one cloud resource uniquely for cleanup tracking.
///
/// Exactly one shape per value, guaranteed by the representation. The
/// internally-tagged serialized form is stable across processes and is what
/// the janitor dedupes on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CloudResourceIdentity {
    GcsBucket {
        bucket: String,
    },
    GcsBlob {
        bucket: String,
        name: String,
    },
    BigQueryDataset {
        project: String,
        dataset: String,
    },
    BigQueryTable {
        project: String,
        dataset: String,
        table: String,
    },
    GcpProject {
        project: String,
    },
    NotebookInstance {
        project: String,
        location: String,
        instance: String,
    },
    Ec2Instance {
        instance_id: String,
    },
    SecurityGroup {
        group_id: String,
    },
}

impl CloudResourceIdentity {
    /// Stable kind string, matching the serialized tag.
    pub fn kind(&self) -> &'static str {
        match self {
            CloudResourceIdentity::GcsBucket { .. } => "gcs_bucket",
            CloudResourceIdentity::GcsBlob { .. } => "gcs_blob",
            CloudResourceIdentity::BigQueryDataset { .. } => "big_query_dataset",
            CloudResourceIdentity::BigQueryTable { .. } => "big_query_table",
            CloudResourceIdentity::GcpProject { .. } => "gcp_project",
            CloudResourceIdentity::NotebookInstance { .. } => "notebook_instance",
            CloudResourceIdentity::Ec2Instance { .. } => "ec2_instance",
            CloudResourceIdentity::SecurityGroup { .. } => "security_group",
        }
    }

    /// Flattened identifier for logs. Compound shapes join with `/`.
    pub fn raw_id(&self) -> String {
        match self {
            CloudResourceIdentity::GcsBucket { bucket } => bucket.clone(),
            CloudResourceIdentity::GcsBlob { bucket, name } => format!("{bucket}/{name}"),
            CloudResourceIdentity::BigQueryDataset { project, dataset } => {
                format!("{project}/{dataset}")
            }
            CloudResourceIdentity::BigQueryTable {
                project,
                dataset,
                table,
            } => format!("{project}/{dataset}/{table}"),
            CloudResourceIdentity::GcpProject { project } => project.clone(),
            CloudResourceIdentity::NotebookInstance {
                project,
                location,
                instance,
            } => format!("{project}/{location}/{instance}"),
            CloudResourceIdentity::Ec2Instance { instance_id } => instance_id.clone(),
            CloudResourceIdentity::SecurityGroup { group_id } => group_id.clone(),
        }
    }

    /// Human-readable description for logging.
    pub fn description(&self) -> String {
        format!("{} {}", self.kind(), self.raw_id())
    }
}

impl std::fmt::Display for CloudResourceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}

/// Owning-client metadata attached to each ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMeta {
    /// Name of the client that issued the create call.
    pub client: String,

    /// Optional time-to-live after which the janitor may reclaim the
    /// resource regardless of other policy.
    pub ttl: Option<Duration>,
}

impl ClientMeta {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            ttl: None,
        }
    }

    pub fn with_ttl(client: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client: client.into(),
            ttl: Some(ttl),
        }
    }
}

/// One published cleanup record: the resource plus its owner.
///
/// Created inside a create-type call path and handed to the janitor
/// publisher immediately; not retained in-process afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupLedgerEntry {
    pub resource: CloudResourceIdentity,
    pub meta: ClientMeta,
    pub recorded_at: DateTime<Utc>,
}

impl CleanupLedgerEntry {
    pub fn new(resource: CloudResourceIdentity, meta: ClientMeta) -> Self {
        Self {
            resource,
            meta,
            recorded_at: Utc::now(),
        }
    }
}
