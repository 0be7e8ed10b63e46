use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{TicketProvider, http_client, json_or_error, str_at};
use crate::error::GraftError;
use crate::model::{Ticket, Transition};

const ASSIGNED_JQL: &str =
    "assignee = currentUser() AND statusCategory != Done ORDER BY updated DESC";

pub struct JiraProvider {
    client: reqwest::Client,
    base_url: String,
    email: String,
    token: String,
}

impl JiraProvider {
    pub fn new(base_url: String, email: String, token: String) -> Result<Self, GraftError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            token,
        })
    }

    fn api(&self, path: &str) -> String {
        format!("{}/rest/api/3{}", self.base_url, path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.basic_auth(&self.email, Some(&self.token))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, label: &str, req: reqwest::RequestBuilder) -> Result<Value, GraftError> {
        let resp = self
            .authed(req)
            .send()
            .await
            .map_err(|e| GraftError::from_reqwest(label, e))?;
        json_or_error(label, resp).await
    }
}

fn ticket_from_issue(issue: &Value) -> Ticket {
    let key = str_at(issue, "/key").to_string();
    Ticket {
        display_key: key.clone(),
        key,
        status: str_at(issue, "/fields/status/name").to_string(),
        summary: str_at(issue, "/fields/summary").to_string(),
    }
}

#[async_trait]
impl TicketProvider for JiraProvider {
    fn name(&self) -> &'static str {
        "jira"
    }

    async fn list_assigned(&self) -> Result<Vec<Ticket>, GraftError> {
        let req = self.client.get(self.api("/search/jql")).query(&[
            ("jql", ASSIGNED_JQL),
            ("fields", "summary,status"),
            ("maxResults", "50"),
        ]);
        let v = self.send("jira search", req).await?;
        let tickets: Vec<Ticket> = v
            .get("issues")
            .and_then(|i| i.as_array())
            .map(|issues| issues.iter().map(ticket_from_issue).collect())
            .unwrap_or_default();
        debug!(count = tickets.len(), "loaded jira issues");
        Ok(tickets)
    }

    async fn get(&self, key: &str) -> Result<Ticket, GraftError> {
        let req = self
            .client
            .get(self.api(&format!("/issue/{key}")))
            .query(&[("fields", "summary,status")]);
        let v = self.send("jira issue", req).await?;
        Ok(ticket_from_issue(&v))
    }

    fn url(&self, ticket: &Ticket) -> String {
        format!("{}/browse/{}", self.base_url, ticket.display_key)
    }

    async fn list_transitions(&self, key: &str) -> Result<Vec<Transition>, GraftError> {
        let req = self
            .client
            .get(self.api(&format!("/issue/{key}/transitions")));
        let v = self.send("jira transitions", req).await?;
        Ok(v.get("transitions")
            .and_then(|t| t.as_array())
            .map(|items| {
                items
                    .iter()
                    .map(|t| Transition {
                        id: str_at(t, "/id").to_string(),
                        name: str_at(t, "/name").to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn apply_transition(&self, key: &str, transition_id: &str) -> Result<(), GraftError> {
        let req = self
            .client
            .post(self.api(&format!("/issue/{key}/transitions")))
            .json(&serde_json::json!({ "transition": { "id": transition_id } }));
        self.send("jira transition", req).await.map(|_| ())
    }
}
