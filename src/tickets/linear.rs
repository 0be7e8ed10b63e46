use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::{TicketProvider, http_client, json_or_error, str_at};
use crate::error::GraftError;
use crate::model::{Ticket, Transition};

const ENDPOINT: &str = "https://api.linear.app/graphql";

const ASSIGNED_QUERY: &str = r#"
query Assigned {
  viewer {
    organization { urlKey }
    assignedIssues(first: 50, filter: { state: { type: { nin: ["completed", "canceled"] } } }) {
      nodes { id identifier title state { name } team { id } }
    }
  }
}"#;

const ISSUE_QUERY: &str = r#"
query Issue($id: String!) {
  issue(id: $id) { id identifier title state { name } team { id } }
}"#;

const TEAM_STATES_QUERY: &str = r#"
query IssueStates($id: String!) {
  issue(id: $id) { team { id states { nodes { id name position } } } }
}"#;

const UPDATE_STATE_MUTATION: &str = r#"
mutation SetState($id: String!, $stateId: String!) {
  issueUpdate(id: $id, input: { stateId: $stateId }) { success }
}"#;

pub struct LinearProvider {
    client: reqwest::Client,
    api_key: String,
    org_url_key: Mutex<Option<String>>,
    /// team id -> workflow states, filled on first transition lookup
    team_states: Mutex<HashMap<String, Vec<Transition>>>,
    /// issue id -> team id
    issue_teams: Mutex<HashMap<String, String>>,
}

impl LinearProvider {
    pub fn new(api_key: String) -> Result<Self, GraftError> {
        Ok(Self {
            client: http_client()?,
            api_key,
            org_url_key: Mutex::new(None),
            team_states: Mutex::new(HashMap::new()),
            issue_teams: Mutex::new(HashMap::new()),
        })
    }

    async fn graphql(&self, label: &str, query: &str, variables: Value) -> Result<Value, GraftError> {
        let resp = self
            .client
            .post(ENDPOINT)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| GraftError::from_reqwest(label, e))?;
        let v = json_or_error(label, resp).await?;
        if let Some(message) = first_graphql_error(&v) {
            return Err(GraftError::network(format!("{label}: {message}")));
        }
        Ok(v.get("data").cloned().unwrap_or(Value::Null))
    }

    fn remember_issue(&self, node: &Value) -> Ticket {
        let id = str_at(node, "/id").to_string();
        let team = str_at(node, "/team/id");
        if !team.is_empty()
            && let Ok(mut teams) = self.issue_teams.lock()
        {
            teams.insert(id.clone(), team.to_string());
        }
        Ticket {
            key: id,
            display_key: str_at(node, "/identifier").to_string(),
            status: str_at(node, "/state/name").to_string(),
            summary: str_at(node, "/title").to_string(),
        }
    }

    fn cached_states(&self, key: &str) -> Option<Vec<Transition>> {
        let team = self.issue_teams.lock().ok()?.get(key).cloned()?;
        self.team_states.lock().ok()?.get(&team).cloned()
    }
}

fn first_graphql_error(v: &Value) -> Option<String> {
    let errors = v.get("errors")?.as_array()?;
    errors
        .first()
        .map(|e| str_at(e, "/message").to_string())
        .filter(|m| !m.is_empty())
}

fn states_from(team: &Value) -> Vec<Transition> {
    let mut states: Vec<(f64, Transition)> = team
        .pointer("/states/nodes")
        .and_then(|n| n.as_array())
        .map(|nodes| {
            nodes
                .iter()
                .map(|s| {
                    let position = s.get("position").and_then(|p| p.as_f64()).unwrap_or(0.0);
                    (
                        position,
                        Transition {
                            id: str_at(s, "/id").to_string(),
                            name: str_at(s, "/name").to_string(),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    states.sort_by(|a, b| a.0.total_cmp(&b.0));
    states.into_iter().map(|(_, t)| t).collect()
}

#[async_trait]
impl TicketProvider for LinearProvider {
    fn name(&self) -> &'static str {
        "linear"
    }

    async fn list_assigned(&self) -> Result<Vec<Ticket>, GraftError> {
        let data = self
            .graphql("linear assigned issues", ASSIGNED_QUERY, json!({}))
            .await?;
        let url_key = str_at(&data, "/viewer/organization/urlKey");
        if !url_key.is_empty()
            && let Ok(mut slot) = self.org_url_key.lock()
        {
            *slot = Some(url_key.to_string());
        }
        let tickets: Vec<Ticket> = data
            .pointer("/viewer/assignedIssues/nodes")
            .and_then(|n| n.as_array())
            .map(|nodes| nodes.iter().map(|n| self.remember_issue(n)).collect())
            .unwrap_or_default();
        debug!(count = tickets.len(), "loaded linear issues");
        Ok(tickets)
    }

    async fn get(&self, key: &str) -> Result<Ticket, GraftError> {
        let data = self
            .graphql("linear issue", ISSUE_QUERY, json!({ "id": key }))
            .await?;
        let node = data
            .get("issue")
            .filter(|n| !n.is_null())
            .ok_or_else(|| GraftError::network(format!("linear issue {key} not found")))?;
        Ok(self.remember_issue(node))
    }

    fn url(&self, ticket: &Ticket) -> String {
        let url_key = self.org_url_key.lock().ok().and_then(|k| k.clone());
        match url_key {
            Some(org) => format!("https://linear.app/{org}/issue/{}", ticket.display_key),
            None => format!("https://linear.app/issue/{}", ticket.display_key),
        }
    }

    async fn list_transitions(&self, key: &str) -> Result<Vec<Transition>, GraftError> {
        if let Some(states) = self.cached_states(key) {
            return Ok(states);
        }
        let data = self
            .graphql("linear workflow states", TEAM_STATES_QUERY, json!({ "id": key }))
            .await?;
        let team = data.pointer("/issue/team").cloned().unwrap_or(Value::Null);
        let states = states_from(&team);
        let team_id = str_at(&team, "/id");
        if !team_id.is_empty() {
            if let Ok(mut cache) = self.team_states.lock() {
                cache.insert(team_id.to_string(), states.clone());
            }
            if let Ok(mut teams) = self.issue_teams.lock() {
                teams.insert(key.to_string(), team_id.to_string());
            }
        }
        Ok(states)
    }

    async fn apply_transition(&self, key: &str, transition_id: &str) -> Result<(), GraftError> {
        let data = self
            .graphql(
                "linear update state",
                UPDATE_STATE_MUTATION,
                json!({ "id": key, "stateId": transition_id }),
            )
            .await?;
        if data.pointer("/issueUpdate/success").and_then(|s| s.as_bool()) == Some(true) {
            Ok(())
        } else {
            Err(GraftError::network(format!("linear refused state change for {key}")))
        }
    }
}
