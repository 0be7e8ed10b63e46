use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::{TicketProvider, http_client, json_or_error, str_at};
use crate::error::GraftError;
use crate::model::{Ticket, Transition};

const API: &str = "https://api.codecks.io";

/// Card statuses a user can move a card into. Codecks has no per-card workflow.
const STATUSES: [(&str, &str); 3] = [
    ("not_started", "Not started"),
    ("started", "Started"),
    ("done", "Done"),
];

const CARD_FIELDS: [&str; 5] = ["cardId", "accountSeq", "title", "status", "deckId"];

pub struct CodecksProvider {
    client: reqwest::Client,
    account: String,
    token: String,
    user_id: Mutex<Option<String>>,
    /// deck id -> deck title
    decks: Mutex<HashMap<String, String>>,
}

impl CodecksProvider {
    pub fn new(account: String, token: String) -> Result<Self, GraftError> {
        Ok(Self {
            client: http_client()?,
            account,
            token,
            user_id: Mutex::new(None),
            decks: Mutex::new(HashMap::new()),
        })
    }

    async fn post(&self, label: &str, path: &str, body: Value) -> Result<Value, GraftError> {
        let resp = self
            .client
            .post(format!("{API}{path}"))
            .header("X-Account", &self.account)
            .header("X-Auth-Token", &self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GraftError::from_reqwest(label, e))?;
        json_or_error(label, resp).await
    }

    async fn query(&self, label: &str, root: Value) -> Result<Value, GraftError> {
        self.post(label, "/", json!({ "query": { "_root": root } }))
            .await
    }

    async fn user_id(&self) -> Result<String, GraftError> {
        if let Some(id) = self.user_id.lock().ok().and_then(|u| u.clone()) {
            return Ok(id);
        }
        let v = self
            .query("codecks user", json!([{ "loggedInUser": ["id"] }]))
            .await?;
        let id = str_at(&v, "/_root/loggedInUser").to_string();
        if id.is_empty() {
            return Err(GraftError::network("codecks user: no logged-in user for token"));
        }
        if let Ok(mut slot) = self.user_id.lock() {
            *slot = Some(id.clone());
        }
        Ok(id)
    }

    async fn ensure_decks(&self) -> Result<(), GraftError> {
        if self.decks.lock().map(|d| !d.is_empty()).unwrap_or(false) {
            return Ok(());
        }
        let v = self
            .query("codecks decks", json!([{ "account": [{ "decks": ["id", "title"] }] }]))
            .await?;
        let titles = deck_titles(&v);
        debug!(count = titles.len(), "cached codecks decks");
        if let Ok(mut decks) = self.decks.lock() {
            decks.extend(titles);
        }
        Ok(())
    }

    fn deck_title(&self, deck_id: &str) -> Option<String> {
        self.decks.lock().ok()?.get(deck_id).cloned()
    }

    fn ticket_from_card(&self, card: &Value) -> Ticket {
        let title = str_at(card, "/title");
        let summary = match self.deck_title(str_at(card, "/deckId")) {
            Some(deck) => format!("[{deck}] {title}"),
            None => title.to_string(),
        };
        let seq = card
            .get("accountSeq")
            .map(|s| match s {
                Value::Number(n) => n.to_string(),
                other => other.as_str().unwrap_or_default().to_string(),
            })
            .unwrap_or_default();
        Ticket {
            key: str_at(card, "/cardId").to_string(),
            display_key: format!("#{seq}"),
            status: status_label(str_at(card, "/status")).to_string(),
            summary,
        }
    }
}

fn status_label(code: &str) -> &str {
    STATUSES
        .iter()
        .find(|(id, _)| *id == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

fn assigned_cards_key(user_id: &str) -> String {
    let filter = json!({
        "assigneeId": user_id,
        "status": { "op": "neq", "value": "done" },
        "isDeleted": false
    });
    format!("cards({filter})")
}

/// Follows the normalized response: `account[<id>][relation]` lists card ids
/// whose bodies live under `card[<id>]`.
fn cards_in<'a>(v: &'a Value, relation: &str) -> Vec<&'a Value> {
    let account_id = str_at(v, "/_root/account");
    let ids = v
        .get("account")
        .and_then(|a| a.get(account_id))
        .and_then(|a| a.get(relation))
        .and_then(|ids| ids.as_array());
    let Some(ids) = ids else {
        return Vec::new();
    };
    ids.iter()
        .filter_map(|id| id.as_str())
        .filter_map(|id| v.get("card").and_then(|c| c.get(id)))
        .collect()
}

fn deck_titles(v: &Value) -> HashMap<String, String> {
    v.get("deck")
        .and_then(|d| d.as_object())
        .map(|decks| {
            decks
                .iter()
                .map(|(id, deck)| (id.clone(), str_at(deck, "/title").to_string()))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl TicketProvider for CodecksProvider {
    fn name(&self) -> &'static str {
        "codecks"
    }

    async fn list_assigned(&self) -> Result<Vec<Ticket>, GraftError> {
        let user = self.user_id().await?;
        self.ensure_decks().await?;
        let relation = assigned_cards_key(&user);
        let v = self
            .query(
                "codecks cards",
                json!([{ "account": [{ relation.as_str(): CARD_FIELDS }] }]),
            )
            .await?;
        let tickets: Vec<Ticket> = cards_in(&v, &relation)
            .into_iter()
            .map(|c| self.ticket_from_card(c))
            .collect();
        debug!(count = tickets.len(), "loaded codecks cards");
        Ok(tickets)
    }

    async fn get(&self, key: &str) -> Result<Ticket, GraftError> {
        let relation = format!("cards({})", json!({ "cardId": key }));
        let v = self
            .query(
                "codecks card",
                json!([{ "account": [{ relation.as_str(): CARD_FIELDS }] }]),
            )
            .await?;
        cards_in(&v, &relation)
            .first()
            .map(|c| self.ticket_from_card(c))
            .ok_or_else(|| GraftError::network(format!("codecks card {key} not found")))
    }

    fn url(&self, ticket: &Ticket) -> String {
        format!("https://{}.codecks.io/card/{}", self.account, ticket.key)
    }

    async fn list_transitions(&self, _key: &str) -> Result<Vec<Transition>, GraftError> {
        Ok(STATUSES
            .iter()
            .map(|(id, name)| Transition {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect())
    }

    async fn apply_transition(&self, key: &str, transition_id: &str) -> Result<(), GraftError> {
        if !STATUSES.iter().any(|(id, _)| *id == transition_id) {
            return Err(GraftError::Validation(format!(
                "unknown codecks status `{transition_id}`"
            )));
        }
        self.post(
            "codecks update card",
            "/dispatch/cards/update",
            json!({ "id": key, "status": transition_id }),
        )
        .await?;
        Ok(())
    }
}
