//! Bounded polling for asynchronous provider operations
//!
//! One wait session polls a status fetch on a fixed interval until the
//! operation reaches a terminal state or the session times out. Sessions
//! block only their own task; polls within a session are strictly
//! sequential and sessions are independent of each other.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Outcome of one status fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Poll<T> {
    /// Not terminal yet; sleep one interval and fetch again.
    Pending,
    /// Terminal with a result.
    Ready(T),
    /// Terminal, but the operation itself carried an error payload
    /// (e.g. a long-running operation that completed unsuccessfully).
    Faulted { code: Option<u16>, message: String },
}

/// Waiter failures.
///
/// `Timeout` and `Unreachable` are deliberately distinct: the first means
/// "ran out of time" (likely transient or slow), the second "the target
/// state can never occur from here" (the resource took an unexpected
/// lifecycle path).
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("invalid wait spec: {0}")]
    InvalidSpec(String),

    #[error("timed out waiting for {what} after {elapsed:?} ({attempts} polls)")]
    Timeout {
        what: String,
        elapsed: Duration,
        attempts: u32,
    },

    #[error("target state unreachable for {what}: {detail}")]
    Unreachable { what: String, detail: String },

    #[error("operation completed with error: {message}")]
    OperationFailed { code: Option<u16>, message: String },

    #[error("unsupported target state '{target}' (supported: {supported:?})")]
    UnsupportedTarget {
        target: String,
        supported: Vec<String>,
    },

    #[error("status fetch failed for {what}")]
    Fetch {
        what: String,
        #[source]
        source: anyhow::Error,
    },
}

type UnreachablePredicate = Arc<dyn Fn(&anyhow::Error) -> bool + Send + Sync>;

/// Configuration for one wait session.
///
/// The unreachable detector is provider-SDK-dependent: it recognizes the
/// SDK's "acceptor transitioned to failure" signal among fetch errors, and
/// its exact shape is not portable across SDK versions. Without one, every
/// fetch error is an ordinary [`WaitError::Fetch`].
#[derive(Clone)]
pub struct WaitSpec {
    poll_interval: Duration,
    timeout: Duration,
    unreachable: Option<UnreachablePredicate>,
}

impl WaitSpec {
    /// Both durations must be strictly positive, with interval ≤ timeout.
    pub fn new(poll_interval: Duration, timeout: Duration) -> Result<Self, WaitError> {
        if poll_interval.is_zero() {
            return Err(WaitError::InvalidSpec(
                "poll interval must be positive".to_string(),
            ));
        }
        if timeout.is_zero() {
            return Err(WaitError::InvalidSpec("timeout must be positive".to_string()));
        }
        if poll_interval > timeout {
            return Err(WaitError::InvalidSpec(format!(
                "poll interval {poll_interval:?} exceeds timeout {timeout:?}"
            )));
        }
        Ok(Self {
            poll_interval,
            timeout,
            unreachable: None,
        })
    }

    /// Install the unreachable-state detector for this session.
    pub fn unreachable_when(
        mut self,
        predicate: impl Fn(&anyhow::Error) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.unreachable = Some(Arc::new(predicate));
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn is_unreachable(&self, error: &anyhow::Error) -> bool {
        self.unreachable.as_ref().is_some_and(|p| p(error))
    }
}

impl std::fmt::Debug for WaitSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitSpec")
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .field("unreachable", &self.unreachable.is_some())
            .finish()
    }
}

/// Poll until the fetch reports a terminal state or the timeout elapses.
///
/// The timeout is checked before each fetch: a session with interval 1 and
/// timeout 3 whose fetch stays pending performs exactly 3 polls.
pub async fn wait_for<T, F, Fut>(
    spec: &WaitSpec,
    what: &str,
    mut fetch: F,
) -> Result<T, WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<Poll<T>>>,
{
    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        let elapsed = started.elapsed();
        if elapsed >= spec.timeout {
            return Err(WaitError::Timeout {
                what: what.to_string(),
                elapsed,
                attempts,
            });
        }

        attempts += 1;
        match fetch().await {
            Ok(Poll::Ready(value)) => {
                debug!(what, attempts, "wait complete");
                return Ok(value);
            }
            Ok(Poll::Faulted { code, message }) => {
                return Err(WaitError::OperationFailed { code, message });
            }
            Ok(Poll::Pending) => {
                debug!(
                    what,
                    attempt = attempts,
                    interval_ms = spec.poll_interval.as_millis() as u64,
                    "still pending"
                );
                tokio::time::sleep(spec.poll_interval).await;
            }
            Err(source) => {
                if spec.is_unreachable(&source) {
                    return Err(WaitError::Unreachable {
                        what: what.to_string(),
                        detail: source.to_string(),
                    });
                }
                return Err(WaitError::Fetch {
                    what: what.to_string(),
                    source,
                });
            }
        }
    }
}

/// Wait until a resource reports the target lifecycle state.
///
/// Each resource type supports a fixed, explicit set of targets; asking for
/// anything else is a caller programming error raised before any fetch.
pub async fn wait_for_state<F, Fut>(
    spec: &WaitSpec,
    what: &str,
    target: &str,
    supported: &[&str],
    mut fetch: F,
) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<String>>,
{
    if !supported.contains(&target) {
        return Err(WaitError::UnsupportedTarget {
            target: target.to_string(),
            supported: supported.iter().map(|s| s.to_string()).collect(),
        });
    }

    wait_for(spec, what, || {
        let fut = fetch();
        async move {
            let state = fut.await?;
            if state == target {
                Ok(Poll::Ready(()))
            } else {
                Ok(Poll::Pending)
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn spec(interval_secs: u64, timeout_secs: u64) -> WaitSpec {
        WaitSpec::new(
            Duration::from_secs(interval_secs),
            Duration::from_secs(timeout_secs),
        )
        .unwrap()
    }

    #[test]
    fn spec_rejects_bad_durations() {
        assert!(matches!(
            WaitSpec::new(Duration::ZERO, Duration::from_secs(1)),
            Err(WaitError::InvalidSpec(_))
        ));
        assert!(matches!(
            WaitSpec::new(Duration::from_secs(1), Duration::ZERO),
            Err(WaitError::InvalidSpec(_))
        ));
        assert!(matches!(
            WaitSpec::new(Duration::from_secs(5), Duration::from_secs(3)),
            Err(WaitError::InvalidSpec(_))
        ));
    }

    #[tokio::test]
    async fn ready_on_first_poll() {
        let result = wait_for(&spec(1, 3), "op", || async { Ok(Poll::Ready(7u32)) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_then_ready() {
        let polls = AtomicU32::new(0);
        let result = wait_for(&spec(1, 10), "op", || {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n >= 2 {
                    Ok(Poll::Ready("done"))
                } else {
                    Ok(Poll::Pending)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_after_exactly_three_polls() {
        let polls = AtomicU32::new(0);
        let result: Result<(), _> = wait_for(&spec(1, 3), "op", || {
            polls.fetch_add(1, Ordering::SeqCst);
            async { Ok(Poll::Pending) }
        })
        .await;

        match result.unwrap_err() {
            WaitError::Timeout { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_beats_timeout() {
        let polls = AtomicU32::new(0);
        let spec = spec(1, 100).unreachable_when(|e| e.to_string().contains("terminal failure"));

        let result: Result<(), _> = wait_for(&spec, "instance", || {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Ok(Poll::Pending)
                } else {
                    Err(anyhow::anyhow!("waiter acceptor reached terminal failure"))
                }
            }
        })
        .await;

        // Well before the 100-unit timeout.
        assert!(matches!(result.unwrap_err(), WaitError::Unreachable { .. }));
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fetch_error_without_detector_is_not_unreachable() {
        let result: Result<(), _> = wait_for(&spec(1, 3), "op", || async {
            Err(anyhow::anyhow!("connection refused"))
        })
        .await;
        assert!(matches!(result.unwrap_err(), WaitError::Fetch { .. }));
    }

    #[tokio::test]
    async fn faulted_operation_surfaces_embedded_error() {
        let result: Result<(), _> = wait_for(&spec(1, 3), "op", || async {
            Ok(Poll::Faulted {
                code: Some(500),
                message: "operation failed upstream".to_string(),
            })
        })
        .await;

        match result.unwrap_err() {
            WaitError::OperationFailed { code, message } => {
                assert_eq!(code, Some(500));
                assert!(message.contains("upstream"));
            }
            other => panic!("expected operation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsupported_target_polls_zero_times() {
        let polls = AtomicU32::new(0);
        let result = wait_for_state(&spec(1, 3), "instance", "hibernating", &["running", "stopped"], || {
            polls.fetch_add(1, Ordering::SeqCst);
            async { Ok("running".to_string()) }
        })
        .await;

        match result.unwrap_err() {
            WaitError::UnsupportedTarget { target, supported } => {
                assert_eq!(target, "hibernating");
                assert_eq!(supported, vec!["running", "stopped"]);
            }
            other => panic!("expected unsupported target, got {other:?}"),
        }
        assert_eq!(polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn state_wait_reaches_target() {
        let polls = AtomicU32::new(0);
        let result = wait_for_state(&spec(1, 10), "instance", "running", &["running", "stopped"], || {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(if n < 2 { "pending" } else { "running" }.to_string())
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }
}
