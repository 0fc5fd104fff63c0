//! AI notebook instance state waiting
//!
//! Notebook instances support exactly three wait targets: `ACTIVE`,
//! `STOPPED`, and `DELETED` (the API reports states in upper case).

use cloudrail::wait::{WaitError, WaitSpec, wait_for_state};
use std::future::Future;
use std::time::Duration;

/// Lifecycle states a notebook wait may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotebookStateTarget {
    Active,
    Stopped,
    Deleted,
}

impl NotebookStateTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotebookStateTarget::Active => "ACTIVE",
            NotebookStateTarget::Stopped => "STOPPED",
            NotebookStateTarget::Deleted => "DELETED",
        }
    }
}

/// The fixed supported target set for notebook instances.
pub const SUPPORTED_NOTEBOOK_STATES: &[&str] = &["ACTIVE", "STOPPED", "DELETED"];

/// Default polling shape for notebook lifecycle transitions.
pub fn default_notebook_wait() -> WaitSpec {
    // Notebook start/stop is slow; minutes, not seconds.
    WaitSpec::new(Duration::from_secs(10), Duration::from_secs(600))
        .unwrap_or_else(|_| unreachable!("constant spec is valid"))
}

/// Wait until the notebook instance reports the target state.
pub async fn wait_for_notebook_state<F, Fut>(
    spec: &WaitSpec,
    instance: &str,
    target: NotebookStateTarget,
    fetch: F,
) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<String>>,
{
    wait_for_state(
        spec,
        &format!("notebook instance {instance}"),
        target.as_str(),
        SUPPORTED_NOTEBOOK_STATES,
        fetch,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_spec() -> WaitSpec {
        WaitSpec::new(Duration::from_secs(1), Duration::from_secs(10)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_notebook_reaches_stopped() {
        let polls = AtomicU32::new(0);
        let result = wait_for_notebook_state(
            &fast_spec(),
            "nb-1",
            NotebookStateTarget::Stopped,
            || {
                let n = polls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(if n < 2 { "STOPPING" } else { "STOPPED" }.to_string()) }
            },
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn never_reaching_target_times_out() {
        let result = wait_for_notebook_state(
            &fast_spec(),
            "nb-1",
            NotebookStateTarget::Active,
            || async { Ok("PROVISIONING".to_string()) },
        )
        .await;

        assert!(matches!(result.unwrap_err(), WaitError::Timeout { .. }));
    }

    #[test]
    fn target_names_match_api_state_names() {
        for target in [
            NotebookStateTarget::Active,
            NotebookStateTarget::Stopped,
            NotebookStateTarget::Deleted,
        ] {
            assert!(SUPPORTED_NOTEBOOK_STATES.contains(&target.as_str()));
        }
    }
}
