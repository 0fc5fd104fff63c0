//! Operation identity and per-call records

use crate::classify::NormalizedError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloud provider a call is issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Google,
    Aws,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Google => write!(f, "google"),
            Provider::Aws => write!(f, "aws"),
        }
    }
}

/// Identifies one logical cloud API call: provider + resource + verb.
///
/// Serialized form is the stable operation name used in logs and metric keys
/// (e.g. `GOOGLE_CREATE_BUCKET`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationId {
    GoogleCreateBucket,
    GoogleDeleteBucket,
    GoogleCreateBlob,
    GoogleDeleteBlob,
    GoogleCreateDataset,
    GoogleDeleteDataset,
    GoogleCreateTable,
    GoogleDeleteTable,
    GoogleCreateProject,
    GoogleCreateNotebook,
    GoogleStartNotebook,
    GoogleStopNotebook,
    GoogleGetOperation,
    AwsRunInstances,
    AwsDescribeInstances,
    AwsStartInstances,
    AwsStopInstances,
    AwsTerminateInstances,
    AwsCreateSecurityGroup,
    AwsDeleteSecurityGroup,
}

impl OperationId {
    /// Stable operation name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationId::GoogleCreateBucket => "GOOGLE_CREATE_BUCKET",
            OperationId::GoogleDeleteBucket => "GOOGLE_DELETE_BUCKET",
            OperationId::GoogleCreateBlob => "GOOGLE_CREATE_BLOB",
            OperationId::GoogleDeleteBlob => "GOOGLE_DELETE_BLOB",
            OperationId::GoogleCreateDataset => "GOOGLE_CREATE_DATASET",
            OperationId::GoogleDeleteDataset => "GOOGLE_DELETE_DATASET",
            OperationId::GoogleCreateTable => "GOOGLE_CREATE_TABLE",
            OperationId::GoogleDeleteTable => "GOOGLE_DELETE_TABLE",
            OperationId::GoogleCreateProject => "GOOGLE_CREATE_PROJECT",
            OperationId::GoogleCreateNotebook => "GOOGLE_CREATE_NOTEBOOK",
            OperationId::GoogleStartNotebook => "GOOGLE_START_NOTEBOOK",
            OperationId::GoogleStopNotebook => "GOOGLE_STOP_NOTEBOOK",
            OperationId::GoogleGetOperation => "GOOGLE_GET_OPERATION",
            OperationId::AwsRunInstances => "AWS_RUN_INSTANCES",
            OperationId::AwsDescribeInstances => "AWS_DESCRIBE_INSTANCES",
            OperationId::AwsStartInstances => "AWS_START_INSTANCES",
            OperationId::AwsStopInstances => "AWS_STOP_INSTANCES",
            OperationId::AwsTerminateInstances => "AWS_TERMINATE_INSTANCES",
            OperationId::AwsCreateSecurityGroup => "AWS_CREATE_SECURITY_GROUP",
            OperationId::AwsDeleteSecurityGroup => "AWS_DELETE_SECURITY_GROUP",
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            OperationId::GoogleCreateBucket
            | OperationId::GoogleDeleteBucket
            | OperationId::GoogleCreateBlob
            | OperationId::GoogleDeleteBlob
            | OperationId::GoogleCreateDataset
            | OperationId::GoogleDeleteDataset
            | OperationId::GoogleCreateTable
            | OperationId::GoogleDeleteTable
            | OperationId::GoogleCreateProject
            | OperationId::GoogleCreateNotebook
            | OperationId::GoogleStartNotebook
            | OperationId::GoogleStopNotebook
            | OperationId::GoogleGetOperation => Provider::Google,
            OperationId::AwsRunInstances
            | OperationId::AwsDescribeInstances
            | OperationId::AwsStartInstances
            | OperationId::AwsStopInstances
            | OperationId::AwsTerminateInstances
            | OperationId::AwsCreateSecurityGroup
            | OperationId::AwsDeleteSecurityGroup => Provider::Aws,
        }
    }

    /// True for operations that create a cloud resource.
    ///
    /// Wrapper convention: every create-verb operation records a
    /// [`crate::identity::CloudResourceIdentity`] with the cleanup recorder
    /// before (or concurrently with) issuing the call.
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            OperationId::GoogleCreateBucket
                | OperationId::GoogleCreateBlob
                | OperationId::GoogleCreateDataset
                | OperationId::GoogleCreateTable
                | OperationId::GoogleCreateProject
                | OperationId::GoogleCreateNotebook
                | OperationId::AwsRunInstances
                | OperationId::AwsCreateSecurityGroup
        )
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status code a success record carries when the SDK reported none.
pub const CODE_OK: u16 = 200;

/// Immutable record of one completed call attempt.
///
/// Created exactly once per executor invocation, handed to the telemetry
/// sink, then discarded. The request payload is a structured document
/// produced by the call site's serializer; the core never inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation: OperationId,
    pub client: String,
    pub duration: Duration,
    /// Normalized HTTP-style status. `None` means the failure was
    /// unclassifiable, which is distinct from code 0.
    pub code: Option<u16>,
    /// Provider-specific reason extracted during classification.
    pub reason: Option<String>,
    /// Rendered detail of the captured error, absent on success.
    pub error: Option<String>,
    pub request: serde_json::Value,
    pub attempt: Option<u32>,
}

impl OperationRecord {
    pub fn success(
        operation: OperationId,
        client: impl Into<String>,
        duration: Duration,
        request: serde_json::Value,
        attempt: Option<u32>,
    ) -> Self {
        Self {
            operation,
            client: client.into(),
            duration,
            code: Some(CODE_OK),
            reason: None,
            error: None,
            request,
            attempt,
        }
    }

    pub fn failure(
        operation: OperationId,
        client: impl Into<String>,
        duration: Duration,
        request: serde_json::Value,
        normalized: NormalizedError,
        detail: String,
        attempt: Option<u32>,
    ) -> Self {
        Self {
            operation,
            client: client.into(),
            duration,
            code: normalized.code,
            reason: normalized.reason,
            error: Some(detail),
            request,
            attempt,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
