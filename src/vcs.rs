use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::GraftError;
use crate::model::{ChangedFile, Snapshot};

mod log_parse;
mod runner;

pub use self::log_parse::{LOG_TEMPLATE, parse_changed_files, parse_log};

/// The external version-control tool. It is the source of truth; nothing here
/// caches or second-guesses its state.
#[async_trait]
pub trait Vcs: Send + Sync {
    async fn snapshot(&self) -> Result<Snapshot, GraftError>;
    async fn changed_files(&self, rev: &str) -> Result<Vec<ChangedFile>, GraftError>;

    async fn describe(&self, rev: &str, message: &str) -> Result<(), GraftError>;
    async fn new_child(&self, rev: &str) -> Result<(), GraftError>;
    async fn edit(&self, rev: &str) -> Result<(), GraftError>;
    async fn squash(&self, rev: &str) -> Result<(), GraftError>;
    async fn abandon(&self, rev: &str) -> Result<(), GraftError>;
    async fn rebase(&self, source: &str, destination: &str) -> Result<(), GraftError>;

    async fn bookmark_create(&self, name: &str, rev: &str) -> Result<(), GraftError>;
    async fn bookmark_move(&self, name: &str, rev: &str) -> Result<(), GraftError>;
    async fn bookmark_delete(&self, name: &str) -> Result<(), GraftError>;

    async fn git_push(&self, bookmark: &str) -> Result<(), GraftError>;
    async fn git_fetch(&self) -> Result<(), GraftError>;
    async fn init(&self) -> Result<(), GraftError>;
    async fn remote_url(&self, name: &str) -> Result<Option<String>, GraftError>;
}

/// `jj` driven as a subprocess.
#[derive(Clone, Debug)]
pub struct JjCli {
    bin: String,
    root: PathBuf,
}

impl JjCli {
    pub fn new(bin: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            bin: bin.into(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Vcs for JjCli {
    async fn snapshot(&self) -> Result<Snapshot, GraftError> {
        self.log_snapshot().await
    }

    async fn changed_files(&self, rev: &str) -> Result<Vec<ChangedFile>, GraftError> {
        self.diff_summary(rev).await
    }

    async fn describe(&self, rev: &str, message: &str) -> Result<(), GraftError> {
        self.run_mutation(&["describe", "-r", rev, "-m", message])
            .await
    }

    async fn new_child(&self, rev: &str) -> Result<(), GraftError> {
        self.run_mutation(&["new", rev]).await
    }

    async fn edit(&self, rev: &str) -> Result<(), GraftError> {
        self.run_mutation(&["edit", rev]).await
    }

    async fn squash(&self, rev: &str) -> Result<(), GraftError> {
        self.run_mutation(&["squash", "-r", rev]).await
    }

    async fn abandon(&self, rev: &str) -> Result<(), GraftError> {
        self.run_mutation(&["abandon", rev]).await
    }

    async fn rebase(&self, source: &str, destination: &str) -> Result<(), GraftError> {
        self.run_mutation(&["rebase", "-s", source, "-d", destination])
            .await
    }

    async fn bookmark_create(&self, name: &str, rev: &str) -> Result<(), GraftError> {
        self.run_mutation(&["bookmark", "create", name, "-r", rev])
            .await
    }

    async fn bookmark_move(&self, name: &str, rev: &str) -> Result<(), GraftError> {
        self.run_mutation(&["bookmark", "set", name, "-r", rev, "--allow-backwards"])
            .await
    }

    async fn bookmark_delete(&self, name: &str) -> Result<(), GraftError> {
        self.run_mutation(&["bookmark", "delete", name]).await
    }

    async fn git_push(&self, bookmark: &str) -> Result<(), GraftError> {
        self.run_mutation(&["git", "push", "--bookmark", bookmark, "--allow-new"])
            .await
    }

    async fn git_fetch(&self) -> Result<(), GraftError> {
        self.run_mutation(&["git", "fetch"]).await
    }

    async fn init(&self) -> Result<(), GraftError> {
        self.init_colocated().await
    }

    async fn remote_url(&self, name: &str) -> Result<Option<String>, GraftError> {
        let out = self.run(&["git", "remote", "list"]).await?;
        Ok(out.lines().find_map(|line| {
            let (remote, url) = line.split_once(char::is_whitespace)?;
            (remote == name).then(|| url.trim().to_string())
        }))
    }
}
