use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One layer of configuration as stored on disk. Unset fields fall through to
/// the next layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_refresh_secs: Option<u64>,

    /// `0` disables the pull-request list timer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_refresh_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_base_branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jj_bin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_provider: Option<TicketProviderKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira: Option<JiraConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linear: Option<LinearConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codecks: Option<CodecksConfig>,
}

impl FileConfig {
    /// Layers `self` over `lower`: every field set here wins.
    pub fn over(self, lower: FileConfig) -> FileConfig {
        FileConfig {
            auto_refresh_secs: self.auto_refresh_secs.or(lower.auto_refresh_secs),
            pr_refresh_secs: self.pr_refresh_secs.or(lower.pr_refresh_secs),
            default_base_branch: self.default_base_branch.or(lower.default_base_branch),
            jj_bin: self.jj_bin.or(lower.jj_bin),
            github_token: self.github_token.or(lower.github_token),
            github_client_id: self.github_client_id.or(lower.github_client_id),
            ticket_provider: self.ticket_provider.or(lower.ticket_provider),
            jira: merge_section(self.jira, lower.jira, JiraConfig::over),
            linear: merge_section(self.linear, lower.linear, LinearConfig::over),
            codecks: merge_section(self.codecks, lower.codecks, CodecksConfig::over),
        }
    }
}

fn merge_section<T>(upper: Option<T>, lower: Option<T>, f: impl FnOnce(T, T) -> T) -> Option<T> {
    match (upper, lower) {
        (Some(u), Some(l)) => Some(f(u, l)),
        (u, l) => u.or(l),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketProviderKind {
    #[default]
    None,
    Jira,
    Linear,
    Codecks,
}

impl TicketProviderKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "off" => Some(TicketProviderKind::None),
            "jira" => Some(TicketProviderKind::Jira),
            "linear" => Some(TicketProviderKind::Linear),
            "codecks" => Some(TicketProviderKind::Codecks),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TicketProviderKind::None => "none",
            TicketProviderKind::Jira => "jira",
            TicketProviderKind::Linear => "linear",
            TicketProviderKind::Codecks => "codecks",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl JiraConfig {
    fn over(self, lower: JiraConfig) -> JiraConfig {
        JiraConfig {
            base_url: self.base_url.or(lower.base_url),
            email: self.email.or(lower.email),
            token: self.token.or(lower.token),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl LinearConfig {
    fn over(self, lower: LinearConfig) -> LinearConfig {
        LinearConfig {
            api_key: self.api_key.or(lower.api_key),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecksConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl CodecksConfig {
    fn over(self, lower: CodecksConfig) -> CodecksConfig {
        CodecksConfig {
            account: self.account.or(lower.account),
            token: self.token.or(lower.token),
        }
    }
}

/// Fully resolved configuration. The core only ever reads these values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub auto_refresh: Duration,
    pub pr_refresh: Option<Duration>,
    pub default_base_branch: String,
    pub jj_bin: String,
    pub github_token: Option<String>,
    pub github_client_id: Option<String>,
    pub ticket_provider: TicketProviderKind,
    pub jira: JiraConfig,
    pub linear: LinearConfig,
    pub codecks: CodecksConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_layers(FileConfig::default())
    }
}

impl Settings {
    pub const DEFAULT_AUTO_REFRESH_SECS: u64 = 3;
    pub const DEFAULT_PR_REFRESH_SECS: u64 = 30;

    pub fn from_layers(cfg: FileConfig) -> Self {
        let pr_secs = cfg
            .pr_refresh_secs
            .unwrap_or(Self::DEFAULT_PR_REFRESH_SECS);
        Settings {
            auto_refresh: Duration::from_secs(
                cfg.auto_refresh_secs
                    .unwrap_or(Self::DEFAULT_AUTO_REFRESH_SECS)
                    .max(1),
            ),
            pr_refresh: (pr_secs > 0).then(|| Duration::from_secs(pr_secs)),
            default_base_branch: cfg
                .default_base_branch
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| "main".to_string()),
            jj_bin: cfg.jj_bin.unwrap_or_else(|| "jj".to_string()),
            github_token: cfg.github_token.filter(|t| !t.trim().is_empty()),
            github_client_id: cfg.github_client_id.filter(|t| !t.trim().is_empty()),
            ticket_provider: cfg.ticket_provider.unwrap_or_default(),
            jira: cfg.jira.unwrap_or_default(),
            linear: cfg.linear.unwrap_or_default(),
            codecks: cfg.codecks.unwrap_or_default(),
        }
    }

    pub fn hosting_enabled(&self) -> bool {
        self.github_token.is_some()
    }

    pub fn tickets_enabled(&self) -> bool {
        self.ticket_provider != TicketProviderKind::None
    }
}
