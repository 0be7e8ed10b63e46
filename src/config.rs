use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{
    CodecksConfig, FileConfig, JiraConfig, LinearConfig, Settings, TicketProviderKind,
};

const CONFIG_FILE: &str = "config.json";

pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("graft").join(CONFIG_FILE))
}

pub fn local_config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(".graft").join(CONFIG_FILE)
}

/// Resolves settings from env vars > local project file > global file.
pub fn load(repo_root: &Path) -> Result<Settings> {
    let global = match global_config_path() {
        Some(path) => read_file_config(&path)?,
        None => FileConfig::default(),
    };
    let local = read_file_config(&local_config_path(repo_root))?;
    let env = env_layer(|key| std::env::var(key).ok());
    Ok(resolve(global, local, env))
}

pub fn resolve(global: FileConfig, local: FileConfig, env: FileConfig) -> Settings {
    Settings::from_layers(env.over(local.over(global)))
}

/// Missing files are an empty layer; malformed files are an error.
pub fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: FileConfig =
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

pub fn write_file_config(path: &Path, cfg: &FileConfig) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(cfg).context("serialize config")?;
    write_atomic(path, &bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Merges `patch` into the file at `path` and writes it back.
pub fn update_file_config(path: &Path, patch: FileConfig) -> Result<FileConfig> {
    let current = read_file_config(path)?;
    let next = patch.over(current);
    write_file_config(path, &next)?;
    Ok(next)
}

pub fn env_layer(get: impl Fn(&str) -> Option<String>) -> FileConfig {
    let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
    let secs = |key: &str| get(key).and_then(|v| v.trim().parse::<u64>().ok());

    let jira = JiraConfig {
        base_url: get("JIRA_BASE_URL"),
        email: get("JIRA_EMAIL"),
        token: get("JIRA_API_TOKEN"),
    };
    let linear = LinearConfig {
        api_key: get("LINEAR_API_KEY"),
    };
    let codecks = CodecksConfig {
        account: get("CODECKS_ACCOUNT"),
        token: get("CODECKS_TOKEN"),
    };

    FileConfig {
        auto_refresh_secs: secs("GRAFT_REFRESH_SECS"),
        pr_refresh_secs: secs("GRAFT_PR_REFRESH_SECS"),
        default_base_branch: get("GRAFT_BASE_BRANCH"),
        jj_bin: get("GRAFT_JJ_BIN"),
        github_token: get("GRAFT_GITHUB_TOKEN").or_else(|| get("GITHUB_TOKEN")),
        github_client_id: get("GRAFT_GITHUB_CLIENT_ID"),
        ticket_provider: get("GRAFT_TICKET_PROVIDER")
            .and_then(|v| TicketProviderKind::parse(&v)),
        jira: (jira != JiraConfig::default()).then_some(jira),
        linear: (linear != LinearConfig::default()).then_some(linear),
        codecks: (codecks != CodecksConfig::default()).then_some(codecks),
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
