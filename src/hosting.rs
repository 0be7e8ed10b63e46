use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::GraftError;
use crate::model::PullRequest;

mod device_flow;
mod github;
mod slug;

pub use self::device_flow::{DeviceCode, LoginPoll, poll_device_token, request_device_code};
pub use self::github::GitHubHost;
pub use self::slug::{RepoSlug, parse_remote_slug};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

/// The code-hosting service that owns pull requests.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    async fn list(&self) -> Result<Vec<PullRequest>, GraftError>;
    async fn create(&self, req: &NewPullRequest) -> Result<PullRequest, GraftError>;
    async fn push(&self, branch: &str) -> Result<(), GraftError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_secs(2),
        }
    }
}

/// Retries `f` while it fails with a retryable error, up to `policy.max_retries`
/// extra attempts. Any other failure is returned immediately.
pub async fn with_retries<T, F, Fut>(
    label: &str,
    policy: RetryPolicy,
    mut f: F,
) -> Result<T, GraftError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, GraftError>>,
{
    let mut retries = 0usize;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(err) if err.is_retryable() && retries < policy.max_retries => {
                retries += 1;
                warn!(%label, retries, error = %err, "retrying after eventual-consistency failure");
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
#[path = "tests/hosting/retry_tests.rs"]
mod tests;
