use std::time::Duration;

use thiserror::Error;

use crate::registry::DecodeError;

/// Failures surfaced to callers of the resolver.
///
/// Best-effort collaborators (results, notifications) never show up here;
/// their failures are logged and the affected attachment is left empty.
#[derive(Debug, Error)]
pub enum Error {
    /// The check definition service failed; nothing can be returned.
    #[error("{0:#}")]
    Source(anyhow::Error),

    /// An attached payload carried a known tag but could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The directory has no executor registered for this routing key.
    #[error("No executors available for route {0}")]
    NoExecutors(String),

    #[error("Coordination directory lookup failed: {0:#}")]
    Directory(anyhow::Error),

    /// Dialing the executor or the call itself failed.
    #[error("Executor dispatch failed: {0:#}")]
    Dispatch(anyhow::Error),

    /// The executor did not answer before the request deadline.
    #[error("Executor did not respond within {0:?}")]
    Timeout(Duration),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
