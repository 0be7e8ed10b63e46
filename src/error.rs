use std::path::PathBuf;

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GraftError {
    #[error("no jj repository at {}", path.display())]
    NotManagedRepository { path: PathBuf },

    #[error("`{command}` failed: {message}")]
    ExternalTool { command: String, message: String },

    #[error("{message}")]
    Network { message: String, status: Option<u16> },

    #[error("{0}")]
    Validation(String),

    /// The hosting service has not caught up with a ref that was just pushed.
    #[error("remote not ready yet: {0}")]
    EventualConsistency(String),

    #[error("change {change_id} is no longer in the repository view")]
    StaleSelection { change_id: String },

    /// The task running an operation panicked or was cancelled.
    #[error("background task stopped: {0}")]
    Interrupted(String),
}

impl GraftError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GraftError::EventualConsistency(_))
    }

    pub fn network(message: impl Into<String>) -> Self {
        GraftError::Network {
            message: message.into(),
            status: None,
        }
    }

    pub(crate) fn from_reqwest(label: &str, err: reqwest::Error) -> Self {
        GraftError::Network {
            message: format!("{label}: {err}"),
            status: err.status().map(|s| s.as_u16()),
        }
    }

    /// Maps an unsuccessful HTTP status to a failure, with auth hints for 401/403.
    pub(crate) fn from_status(label: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let message = if status == reqwest::StatusCode::UNAUTHORIZED {
            format!("{label}: unauthorized (token invalid or expired)")
        } else if status == reqwest::StatusCode::FORBIDDEN {
            format!("{label}: forbidden (token lacks the required scope)")
        } else {
            let detail = body.trim();
            if detail.is_empty() {
                format!("{label}: HTTP {}", status.as_u16())
            } else {
                format!("{label}: HTTP {}: {}", status.as_u16(), detail)
            }
        };
        GraftError::Network {
            message,
            status: Some(status.as_u16()),
        }
    }
}
