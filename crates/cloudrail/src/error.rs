//! Core error types

use thiserror::Error;

/// Raised when a cleanup ledger entry cannot be handed to the janitor.
///
/// Carries the publisher's own failure message. Callers in CI/test contexts
/// usually log this and continue with the primary operation, since an
/// unpublished record means an un-cleaned resource rather than a broken call.
#[derive(Debug, Error)]
#[error("janitor publish failed: {0}")]
pub struct PublishError(pub String);

/// Errors raised by the substrate itself.
///
/// Provider call failures are never represented here: the executor re-raises
/// the original error value unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cleanup recording unavailable: {0}")]
    CleanupUnavailable(#[from] PublishError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
