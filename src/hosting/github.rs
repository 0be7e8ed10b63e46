use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{NewPullRequest, PullRequestHost, RepoSlug, parse_remote_slug};
use crate::error::GraftError;
use crate::model::{PrState, PullRequest};
use crate::vcs::Vcs;

const API_BASE: &str = "https://api.github.com";
const REMOTE: &str = "origin";

pub struct GitHubHost {
    client: reqwest::Client,
    token: String,
    api_base: String,
    vcs: Arc<dyn Vcs>,
    slug: OnceCell<RepoSlug>,
}

#[derive(Deserialize)]
struct GhRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct GhPull {
    number: u64,
    title: String,
    html_url: String,
    state: String,
    #[serde(default)]
    merged_at: Option<String>,
    head: GhRef,
    base: GhRef,
}

impl From<GhPull> for PullRequest {
    fn from(p: GhPull) -> Self {
        let state = if p.merged_at.is_some() {
            PrState::Merged
        } else if p.state == "open" {
            PrState::Open
        } else {
            PrState::Closed
        };
        PullRequest {
            number: p.number,
            title: p.title,
            head_branch: p.head.name,
            base_branch: p.base.name,
            state,
            url: p.html_url,
        }
    }
}

impl GitHubHost {
    pub fn new(token: String, vcs: Arc<dyn Vcs>) -> Result<Self, GraftError> {
        let client = reqwest::Client::builder()
            .user_agent("graft")
            .build()
            .map_err(|e| GraftError::from_reqwest("build http client", e))?;
        Ok(Self {
            client,
            token,
            api_base: API_BASE.to_string(),
            vcs,
            slug: OnceCell::new(),
        })
    }

    async fn slug(&self) -> Result<&RepoSlug, GraftError> {
        self.slug
            .get_or_try_init(|| async {
                let url = self.vcs.remote_url(REMOTE).await?.ok_or_else(|| {
                    GraftError::Validation(format!("no `{REMOTE}` git remote configured"))
                })?;
                let slug = parse_remote_slug(&url).ok_or_else(|| {
                    GraftError::Validation(format!("`{REMOTE}` is not a GitHub remote: {url}"))
                })?;
                debug!(owner = %slug.owner, repo = %slug.repo, "resolved github repository");
                Ok(slug)
            })
            .await
    }

    async fn pulls_url(&self) -> Result<String, GraftError> {
        let slug = self.slug().await?;
        Ok(format!(
            "{}/repos/{}/{}/pulls",
            self.api_base, slug.owner, slug.repo
        ))
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

#[async_trait]
impl PullRequestHost for GitHubHost {
    async fn list(&self) -> Result<Vec<PullRequest>, GraftError> {
        let url = self.pulls_url().await?;
        let resp = self
            .authed(self.client.get(&url))
            .query(&[("state", "all"), ("per_page", "100"), ("sort", "updated")])
            .send()
            .await
            .map_err(|e| GraftError::from_reqwest("list pull requests", e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GraftError::from_status("list pull requests", status, &body));
        }
        let pulls: Vec<GhPull> = resp
            .json()
            .await
            .map_err(|e| GraftError::from_reqwest("parse pull requests", e))?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    async fn create(&self, req: &NewPullRequest) -> Result<PullRequest, GraftError> {
        let url = self.pulls_url().await?;
        let resp = self
            .authed(self.client.post(&url))
            .json(&serde_json::json!({
                "title": req.title,
                "body": req.body,
                "head": req.head,
                "base": req.base,
            }))
            .send()
            .await
            .map_err(|e| GraftError::from_reqwest("create pull request", e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_create_failure(status.as_u16(), &body)
                .unwrap_or_else(|| GraftError::from_status("create pull request", status, &body)));
        }
        let pull: GhPull = resp
            .json()
            .await
            .map_err(|e| GraftError::from_reqwest("parse created pull request", e))?;
        info!(number = pull.number, head = %req.head, "created pull request");
        Ok(pull.into())
    }

    async fn push(&self, branch: &str) -> Result<(), GraftError> {
        self.vcs.git_push(branch).await
    }
}

/// GitHub answers 422 with an error on the `head` field when a just-pushed
/// branch has not been indexed yet.
pub(crate) fn classify_create_failure(status: u16, body: &str) -> Option<GraftError> {
    if status != 422 {
        return None;
    }
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    let errors = v.get("errors")?.as_array()?;
    let head_error = errors.iter().any(|e| {
        e.get("field").and_then(|f| f.as_str()) == Some("head")
            || e.get("message")
                .and_then(|m| m.as_str())
                .is_some_and(|m| m.contains("head") && m.contains("not"))
    });
    head_error.then(|| {
        let message = v
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Validation Failed");
        GraftError::EventualConsistency(format!("{message}: head branch not visible yet"))
    })
}

#[cfg(test)]
#[path = "../tests/hosting/github_tests.rs"]
mod tests;
