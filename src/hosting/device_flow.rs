use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::GraftError;

const DEVICE_CODE_URL: &str = "https://github.com/login/device/code";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
const SCOPES: &str = "repo read:org";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default)]
    pub expires_in: u64,
}

fn default_interval() -> u64 {
    5
}

impl DeviceCode {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginPoll {
    /// The user has not finished authorizing yet.
    Pending { slow_down: bool },
    Granted(String),
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

fn client() -> Result<reqwest::Client, GraftError> {
    reqwest::Client::builder()
        .user_agent("graft")
        .build()
        .map_err(|e| GraftError::from_reqwest("build http client", e))
}

pub async fn request_device_code(client_id: &str) -> Result<DeviceCode, GraftError> {
    let resp = client()?
        .post(DEVICE_CODE_URL)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&[("client_id", client_id), ("scope", SCOPES)])
        .send()
        .await
        .map_err(|e| GraftError::from_reqwest("request device code", e))?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GraftError::from_status("request device code", status, &body));
    }
    let code: DeviceCode = resp
        .json()
        .await
        .map_err(|e| GraftError::from_reqwest("parse device code", e))?;
    info!(verification_uri = %code.verification_uri, "started github device login");
    Ok(code)
}

pub async fn poll_device_token(client_id: &str, device_code: &str) -> Result<LoginPoll, GraftError> {
    let resp = client()?
        .post(TOKEN_URL)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&[
            ("client_id", client_id),
            ("device_code", device_code),
            ("grant_type", GRANT_TYPE),
        ])
        .send()
        .await
        .map_err(|e| GraftError::from_reqwest("poll device token", e))?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GraftError::from_status("poll device token", status, &body));
    }
    let body: TokenResponse = resp
        .json()
        .await
        .map_err(|e| GraftError::from_reqwest("parse device token", e))?;
    interpret_token_response(body)
}

fn interpret_token_response(body: TokenResponse) -> Result<LoginPoll, GraftError> {
    if let Some(token) = body.access_token.filter(|t| !t.is_empty()) {
        return Ok(LoginPoll::Granted(token));
    }
    match body.error.as_deref() {
        Some("authorization_pending") => Ok(LoginPoll::Pending { slow_down: false }),
        Some("slow_down") => {
            debug!("github asked to slow down device polling");
            Ok(LoginPoll::Pending { slow_down: true })
        }
        Some(code) => Err(GraftError::network(format!(
            "github login failed: {}",
            body.error_description.as_deref().unwrap_or(code)
        ))),
        None => Err(GraftError::network("github login failed: empty token response")),
    }
}
