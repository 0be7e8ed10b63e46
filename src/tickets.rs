use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GraftError;
use crate::model::{Settings, Ticket, TicketProviderKind, Transition};

mod codecks;
mod jira;
mod linear;

pub use self::codecks::CodecksProvider;
pub use self::jira::JiraProvider;
pub use self::linear::LinearProvider;

/// A ticket tracker. Exactly one is active at a time; the UI never branches on
/// which one it is.
#[async_trait]
pub trait TicketProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn list_assigned(&self) -> Result<Vec<Ticket>, GraftError>;
    async fn get(&self, key: &str) -> Result<Ticket, GraftError>;
    fn url(&self, ticket: &Ticket) -> String;
    async fn list_transitions(&self, key: &str) -> Result<Vec<Transition>, GraftError>;
    async fn apply_transition(&self, key: &str, transition_id: &str) -> Result<(), GraftError>;
}

/// Builds the provider selected by configuration, or `None` when disabled.
pub fn from_settings(settings: &Settings) -> Result<Option<Arc<dyn TicketProvider>>, GraftError> {
    let provider: Arc<dyn TicketProvider> = match settings.ticket_provider {
        TicketProviderKind::None => return Ok(None),
        TicketProviderKind::Jira => {
            let cfg = &settings.jira;
            Arc::new(JiraProvider::new(
                required(&cfg.base_url, "jira.base_url")?,
                required(&cfg.email, "jira.email")?,
                required(&cfg.token, "jira.token")?,
            )?)
        }
        TicketProviderKind::Linear => Arc::new(LinearProvider::new(required(
            &settings.linear.api_key,
            "linear.api_key",
        )?)?),
        TicketProviderKind::Codecks => {
            let cfg = &settings.codecks;
            Arc::new(CodecksProvider::new(
                required(&cfg.account, "codecks.account")?,
                required(&cfg.token, "codecks.token")?,
            )?)
        }
    };
    Ok(Some(provider))
}

fn required(value: &Option<String>, name: &str) -> Result<String, GraftError> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GraftError::Validation(format!("ticket provider needs `{name}`")))
}

pub(crate) fn http_client() -> Result<reqwest::Client, GraftError> {
    reqwest::Client::builder()
        .user_agent("graft")
        .build()
        .map_err(|e| GraftError::from_reqwest("build http client", e))
}

pub(crate) async fn json_or_error(
    label: &str,
    resp: reqwest::Response,
) -> Result<serde_json::Value, GraftError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GraftError::from_status(label, status, &body));
    }
    if status == reqwest::StatusCode::NO_CONTENT {
        return Ok(serde_json::Value::Null);
    }
    resp.json()
        .await
        .map_err(|e| GraftError::from_reqwest(label, e))
}

pub(crate) fn str_at<'a>(v: &'a serde_json::Value, pointer: &str) -> &'a str {
    v.pointer(pointer).and_then(|x| x.as_str()).unwrap_or("")
}

/// Suggested bookmark name for work on `ticket`: `<display key>-<summary slug>`.
pub fn bookmark_name_for(ticket: &Ticket) -> String {
    const MAX_LEN: usize = 48;
    let raw = format!("{} {}", ticket.display_key, ticket.summary);
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
        if out.len() >= MAX_LEN {
            break;
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
#[path = "tests/tickets/registry_tests.rs"]
mod tests;
