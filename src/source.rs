use std::time::Duration;

use async_trait::async_trait;

use crate::config::NetworkConfig;
use crate::error::{ForkviewError, Result};
use crate::types::{ForkPage, ForkQuery, RepoId, RepoMeta};

/// Remote collection of forks for one repository.
#[async_trait]
pub trait ForkSource: Send + Sync + std::fmt::Debug {
    /// Default branch and fork count of `repo`.
    async fn repo_meta(&self, repo: &RepoId) -> Result<RepoMeta>;

    /// One page of forks, starting after `query.after`.
    async fn fork_page(&self, query: &ForkQuery) -> Result<ForkPage>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one fails.
    pub retries: u32,
    /// Delay before the first retry; doubles after each attempt.
    pub backoff: Duration,
    /// Upper bound for a single attempt.
    pub timeout: Duration,
}

impl From<&NetworkConfig> for RetryPolicy {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            retries: config.retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Fetch a page, retrying transient failures within `policy`.
pub async fn fetch_with_retry(
    source: &dyn ForkSource,
    query: &ForkQuery,
    policy: RetryPolicy,
) -> Result<ForkPage> {
    let mut attempt = 0;
    let mut delay = policy.backoff;

    loop {
        let outcome = match tokio::time::timeout(policy.timeout, source.fork_page(query)).await {
            Ok(result) => result,
            Err(_) => Err(ForkviewError::Timeout(policy.timeout)),
        };

        match outcome {
            Ok(page) => return Ok(page),
            Err(err) if err.is_transient() && attempt < policy.retries => {
                attempt += 1;
                tracing::warn!(attempt, error = %err, "fork page fetch failed, retrying");
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
            Err(err) => return Err(err),
        }
    }
}
