//! Long-running operation polling
//!
//! Google long-running operations return a handle immediately and complete
//! later; their status document carries `done`, and on completion either a
//! `response` or an `error` with a gRPC code. This module adapts that
//! document shape onto the core waiter.

use crate::classify::grpc_to_http;
use cloudrail::wait::{Poll, WaitError, WaitSpec, wait_for};
use std::future::Future;

/// Interpret one operation document fetch.
///
/// `done: false` (or absent) is pending; `done: true` with an `error` field
/// is a fault carrying the operation's own status; otherwise the
/// `response` document (possibly null) is the result.
pub fn poll_operation(doc: &serde_json::Value) -> Poll<serde_json::Value> {
    if !doc.get("done").and_then(serde_json::Value::as_bool).unwrap_or(false) {
        return Poll::Pending;
    }
    match doc.get("error") {
        Some(error) => Poll::Faulted {
            code: error
                .get("code")
                .and_then(serde_json::Value::as_i64)
                .map(|c| grpc_to_http(tonic::Code::from(c as i32))),
            message: error
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("operation failed without message")
                .to_string(),
        },
        None => Poll::Ready(doc.get("response").cloned().unwrap_or(serde_json::Value::Null)),
    }
}

/// Poll an operation until it completes or the spec times out.
///
/// `fetch` retrieves the current operation document (typically a
/// `GOOGLE_GET_OPERATION` call through the executor).
pub async fn wait_for_operation<F, Fut>(
    spec: &WaitSpec,
    operation_name: &str,
    mut fetch: F,
) -> Result<serde_json::Value, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<serde_json::Value>>,
{
    wait_for(spec, operation_name, || {
        let fut = fetch();
        async move { Ok(poll_operation(&fut.await?)) }
    })
    .await
}
