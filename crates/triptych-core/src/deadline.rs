//! Deadline bound for a pending provider call

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Default per-provider deadline
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(60_000);

/// The bound elapsed before the wrapped operation settled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label} timed out after {ms} ms")]
pub struct DeadlineExceeded {
    pub label: String,
    pub ms: u128,
}

/// Race `fut` against `limit`, returning whichever settles first.
///
/// This bounds how long we wait, not how long the remote side works: the
/// losing future is dropped and its eventual result discarded.
pub async fn with_deadline<T, F>(label: &str, limit: Duration, fut: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(value) => Ok(value),
        Err(_) => Err(DeadlineExceeded {
            label: label.to_string(),
            ms: limit.as_millis(),
        }),
    }
}
