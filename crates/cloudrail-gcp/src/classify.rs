//! Google error families
//!
//! Three unrelated Google-side error shapes normalize here: the HTTP
//! transport library (`reqwest`), gRPC API statuses (`tonic`), and the
//! base HTTP service error surfaced by REST-style Google APIs.

use cloudrail::{ClassifierRule, NormalizedError};
use std::error::Error as StdError;
use thiserror::Error;

/// Base HTTP service error shape for REST-style Google APIs.
///
/// Wrappers around APIs that answer with an `{error: {code, status,
/// message}}` document raise this type; the classifier reads the embedded
/// code straight out of it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("google api error {code} ({status}): {message}")]
pub struct GoogleApiError {
    /// HTTP status from the error document.
    pub code: u16,
    /// Canonical status name, e.g. `ALREADY_EXISTS`.
    pub status: String,
    pub message: String,
}

impl GoogleApiError {
    pub fn new(code: u16, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            status: status.into(),
            message: message.into(),
        }
    }
}

/// Standard gRPC code to HTTP status mapping.
pub fn grpc_to_http(code: tonic::Code) -> u16 {
    use tonic::Code;
    match code {
        Code::Ok => 200,
        Code::Cancelled => 499,
        Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => 400,
        Code::Unauthenticated => 401,
        Code::PermissionDenied => 403,
        Code::NotFound => 404,
        Code::AlreadyExists | Code::Aborted => 409,
        Code::ResourceExhausted => 429,
        Code::Unimplemented => 501,
        Code::Unavailable => 503,
        Code::DeadlineExceeded => 504,
        // Unknown, Internal, DataLoss
        _ => 500,
    }
}

fn extract_reqwest(err: &(dyn StdError + 'static)) -> Option<NormalizedError> {
    let e = err.downcast_ref::<reqwest::Error>()?;
    Some(NormalizedError {
        // Transport-level failures (connect, timeout) carry no status;
        // they classify with an empty code but keep the reason.
        code: e.status().map(|s| s.as_u16()),
        reason: Some(e.to_string()),
    })
}

fn extract_grpc(err: &(dyn StdError + 'static)) -> Option<NormalizedError> {
    let status = err.downcast_ref::<tonic::Status>()?;
    Some(NormalizedError::new(
        grpc_to_http(status.code()),
        status.message(),
    ))
}

fn extract_api(err: &(dyn StdError + 'static)) -> Option<NormalizedError> {
    let e = err.downcast_ref::<GoogleApiError>()?;
    Some(NormalizedError::new(e.code, e.status.clone()))
}

/// Ordered Google classifier rules: HTTP library, then gRPC, then the base
/// HTTP service shape.
pub fn rules() -> Vec<ClassifierRule> {
    vec![
        ClassifierRule::new("google-http", extract_reqwest),
        ClassifierRule::new("google-grpc", extract_grpc),
        ClassifierRule::new("google-api", extract_api),
    ]
}
