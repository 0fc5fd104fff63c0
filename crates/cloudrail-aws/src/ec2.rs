//! EC2 instance-state waiting
//!
//! Instances support exactly three wait targets: `running`, `stopped`, and
//! `terminated`. Anything else is a caller programming error surfaced by
//! the core waiter before any polling.

use cloudrail::wait::{WaitError, WaitSpec, wait_for_state};
use std::future::Future;
use std::time::Duration;

/// Lifecycle states an EC2 instance wait may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceStateTarget {
    Running,
    Stopped,
    Terminated,
}

impl InstanceStateTarget {
    /// Canonical EC2 state name, as reported by `DescribeInstances`.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStateTarget::Running => "running",
            InstanceStateTarget::Stopped => "stopped",
            InstanceStateTarget::Terminated => "terminated",
        }
    }
}

/// The fixed supported target set for instances.
pub const SUPPORTED_INSTANCE_STATES: &[&str] = &["running", "stopped", "terminated"];

/// Matches the EC2 waiter's terminal-failure signal among fetch errors.
///
/// The SDK reports "state unreachable" through its waiter error message;
/// the exact wording is SDK-version-dependent, which is why this lives in
/// the provider crate and is only the default predicate.
pub fn waiter_failure_signal(error: &anyhow::Error) -> bool {
    let rendered = error.to_string();
    rendered.contains("transitioned the waiter to failure state")
        || rendered.contains("FailureState")
}

/// Default polling shape for instance lifecycle transitions.
pub fn default_instance_wait() -> WaitSpec {
    // Instances routinely take a couple of minutes to transition.
    WaitSpec::new(Duration::from_secs(5), Duration::from_secs(300))
        .unwrap_or_else(|_| unreachable!("constant spec is valid"))
        .unreachable_when(waiter_failure_signal)
}

/// Extract the canonical state name from a described instance.
pub fn instance_state(instance: &aws_sdk_ec2::types::Instance) -> anyhow::Result<String> {
    instance
        .state()
        .and_then(|s| s.name())
        .map(|n| n.as_str().to_string())
        .ok_or_else(|| anyhow::anyhow!("instance has no reported state"))
}

/// Wait until the instance reports the target state.
///
/// `fetch` returns the instance's current canonical state name; it is
/// polled strictly sequentially on the spec's interval.
pub async fn wait_for_instance_state<F, Fut>(
    spec: &WaitSpec,
    instance_id: &str,
    target: InstanceStateTarget,
    fetch: F,
) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<String>>,
{
    wait_for_state(
        spec,
        &format!("ec2 instance {instance_id}"),
        target.as_str(),
        SUPPORTED_INSTANCE_STATES,
        fetch,
    )
    .await
}
