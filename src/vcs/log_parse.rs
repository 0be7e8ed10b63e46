use tracing::debug;

use super::JjCli;
use crate::error::GraftError;
use crate::model::{ChangedFile, Commit, FileStatus, Snapshot};

const FIELD_SEP: char = '\u{1f}';
const FIELD_COUNT: usize = 11;

/// One line per commit, fields separated by U+001F.
pub const LOG_TEMPLATE: &str = concat!(
    r#"commit_id ++ "\x1f" ++ change_id ++ "\x1f" ++ "#,
    r#"parents.map(|p| p.commit_id()).join(",") ++ "\x1f" ++ "#,
    r#"local_bookmarks.map(|b| b.name()).join(",") ++ "\x1f" ++ "#,
    r#"if(current_working_copy, "1", "0") ++ "\x1f" ++ "#,
    r#"if(immutable, "1", "0") ++ "\x1f" ++ "#,
    r#"if(conflict, "1", "0") ++ "\x1f" ++ "#,
    r#"if(divergent, "1", "0") ++ "\x1f" ++ "#,
    r#"description.first_line() ++ "\x1f" ++ "#,
    r#"author.name() ++ "\x1f" ++ "#,
    r#"author.timestamp().format("%Y-%m-%dT%H:%M:%S%:z") ++ "\n""#,
);

impl JjCli {
    pub(super) async fn log_snapshot(&self) -> Result<Snapshot, GraftError> {
        let out = self
            .run(&["log", "--no-graph", "-T", LOG_TEMPLATE])
            .await?;
        let snapshot = parse_log(&out)?;
        debug!(commits = snapshot.len(), "parsed jj log");
        Ok(snapshot)
    }

    pub(super) async fn diff_summary(&self, rev: &str) -> Result<Vec<ChangedFile>, GraftError> {
        let out = self.run(&["diff", "--summary", "-r", rev]).await?;
        Ok(parse_changed_files(&out))
    }
}

pub fn parse_log(out: &str) -> Result<Snapshot, GraftError> {
    let mut commits = Vec::new();
    for line in out.lines().filter(|l| !l.trim().is_empty()) {
        commits.push(parse_commit_line(line)?);
    }
    Ok(Snapshot::new(commits))
}

fn parse_commit_line(line: &str) -> Result<Commit, GraftError> {
    let fields: Vec<&str> = line.split(FIELD_SEP).collect();
    if fields.len() != FIELD_COUNT {
        return Err(GraftError::ExternalTool {
            command: "jj log".to_string(),
            message: format!(
                "unexpected log record with {} fields (expected {})",
                fields.len(),
                FIELD_COUNT
            ),
        });
    }
    Ok(Commit {
        id: fields[0].to_string(),
        change_id: fields[1].to_string(),
        parents: split_list(fields[2]),
        branches: split_list(fields[3]),
        is_working: fields[4] == "1",
        immutable: fields[5] == "1",
        conflicted: fields[6] == "1",
        divergent: fields[7] == "1",
        summary: fields[8].to_string(),
        author: fields[9].to_string(),
        timestamp: fields[10].to_string(),
    })
}

fn split_list(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `jj diff --summary` output (`M path` per line).
pub fn parse_changed_files(out: &str) -> Vec<ChangedFile> {
    out.lines()
        .filter_map(|line| {
            let mut chars = line.chars();
            let status = FileStatus::from_code(chars.next()?)?;
            let path = chars.as_str().trim();
            (!path.is_empty()).then(|| ChangedFile {
                status,
                path: path.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../tests/vcs/log_parse_tests.rs"]
mod tests;
