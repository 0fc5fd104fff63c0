//! AWS SDK error family
//!
//! Extracts the embedded status from AWS SDK operation errors using
//! `ProvideErrorMetadata` rather than string matching on Debug output; a
//! debug-string code scan remains as the last-resort rule for SDK error
//! shapes that arrive type-erased.

use aws_sdk_ec2::error::{ProvideErrorMetadata, SdkError};
use cloudrail::{ClassifierRule, NormalizedError};
use std::error::Error as StdError;

/// AWS error code strings mapped to HTTP-style status codes.
///
/// Only codes with an unambiguous HTTP reading are mapped; anything else
/// keeps its code string as the reason with no numeric status.
const CODE_TO_STATUS: &[(&str, u16)] = &[
    // Not found
    ("InvalidInstanceID.NotFound", 404),
    ("InvalidGroup.NotFound", 404),
    ("InvalidPermission.NotFound", 404),
    ("NoSuchBucket", 404),
    ("NoSuchKey", 404),
    // Already exists / conflict
    ("InvalidPermission.Duplicate", 409),
    ("InvalidGroup.Duplicate", 409),
    ("BucketAlreadyOwnedByYou", 409),
    ("BucketAlreadyExists", 409),
    ("DependencyViolation", 409),
    ("IncorrectInstanceState", 409),
    // Throttling
    ("Throttling", 429),
    ("ThrottlingException", 429),
    ("RequestLimitExceeded", 429),
    // Auth
    ("AuthFailure", 403),
    ("UnauthorizedOperation", 403),
    ("AccessDenied", 403),
    // Bad request
    ("InvalidParameterValue", 400),
    ("ValidationError", 400),
];

fn status_for_code(code: &str) -> Option<u16> {
    CODE_TO_STATUS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, status)| *status)
}

/// Normalize from the parts every AWS service error exposes: the raw HTTP
/// status when the response survived, else the mapped code string.
fn normalize_parts(
    http_status: Option<u16>,
    code: Option<&str>,
    message: Option<&str>,
) -> NormalizedError {
    let reason = code
        .map(str::to_string)
        .or_else(|| message.map(str::to_string));
    NormalizedError {
        code: http_status.or_else(|| code.and_then(status_for_code)),
        reason,
    }
}

macro_rules! try_sdk_errors {
    ($err:expr, $($op:ty),+ $(,)?) => {
        $(
            if let Some(e) = $err.downcast_ref::<SdkError<$op>>() {
                let meta = ProvideErrorMetadata::meta(e);
                let status = e.raw_response().map(|r| r.status().as_u16());
                return Some(normalize_parts(status, meta.code(), meta.message()));
            }
        )+
    };
}

fn extract_sdk(err: &(dyn StdError + 'static)) -> Option<NormalizedError> {
    try_sdk_errors!(
        err,
        aws_sdk_ec2::operation::run_instances::RunInstancesError,
        aws_sdk_ec2::operation::describe_instances::DescribeInstancesError,
        aws_sdk_ec2::operation::start_instances::StartInstancesError,
        aws_sdk_ec2::operation::stop_instances::StopInstancesError,
        aws_sdk_ec2::operation::terminate_instances::TerminateInstancesError,
        aws_sdk_ec2::operation::create_security_group::CreateSecurityGroupError,
        aws_sdk_ec2::operation::delete_security_group::DeleteSecurityGroupError,
        aws_sdk_s3::operation::create_bucket::CreateBucketError,
        aws_sdk_s3::operation::delete_bucket::DeleteBucketError,
    );
    None
}

/// Last-resort extraction from a `code: Some("...")` fragment in the Debug
/// rendering, for SDK errors that reach the classifier type-erased.
fn extract_debug_code(err: &(dyn StdError + 'static)) -> Option<NormalizedError> {
    let debug = format!("{err:?}");
    let start = debug.find("code: Some(\"")?;
    let rest = &debug[start + 12..];
    let end = rest.find('"')?;
    let code = &rest[..end];
    Some(NormalizedError {
        code: status_for_code(code),
        reason: Some(code.to_string()),
    })
}

/// Ordered AWS classifier rules: typed SDK extraction first, debug-string
/// scan last.
pub fn rules() -> Vec<ClassifierRule> {
    vec![
        ClassifierRule::new("aws-sdk", extract_sdk),
        ClassifierRule::new("aws-debug-code", extract_debug_code),
    ]
}
