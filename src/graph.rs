//! Per-commit pull-request workflow availability.
//!
//! A commit can *update* a pull request when it, or an ancestor, carries a
//! bookmark with an open PR; it can *create* one when it, or an ancestor,
//! carries any other bookmark. Ownership is pushed down to descendants by
//! repeated passes until nothing changes, so the result does not depend on
//! the order commits appear in the snapshot. PR ownership always beats plain
//! bookmark ownership.
//!
//! The result is derived from the snapshot plus the open-PR set on demand and
//! never stored.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::model::{Commit, PrState, PullRequest, Snapshot};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrActions {
    /// commit id -> branch with an open PR that the commit can push into
    pub commit_to_pr_branch: HashMap<String, String>,
    /// commit id -> bookmark the commit can open a new PR from
    pub commit_to_bookmark: HashMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrAvailability {
    Update { branch: String, direct: bool },
    Create { bookmark: String, direct: bool },
    Unavailable,
}

pub fn open_pr_branches(prs: &[PullRequest]) -> HashSet<String> {
    prs.iter()
        .filter(|pr| pr.state == PrState::Open)
        .map(|pr| pr.head_branch.clone())
        .collect()
}

impl PrActions {
    pub fn derive(snapshot: &Snapshot, open_prs: &HashSet<String>) -> Self {
        let mut out = PrActions::default();

        for commit in snapshot.commits() {
            if let Some(branch) = commit.branches.iter().find(|b| open_prs.contains(*b)) {
                out.commit_to_pr_branch
                    .insert(commit.id.clone(), branch.clone());
            } else if let Some(bookmark) = commit.branches.first() {
                out.commit_to_bookmark
                    .insert(commit.id.clone(), bookmark.clone());
            }
        }

        // Seeded PR owners never change. Everyone else takes the first parent,
        // in `parents` order, that has an entry, re-evaluated every pass so a
        // merge settles on the same parent whatever the snapshot order is.
        let pr_owners: HashSet<String> = out.commit_to_pr_branch.keys().cloned().collect();
        let mut passes = 0usize;
        loop {
            passes += 1;
            let mut changed = false;
            for commit in snapshot.commits() {
                if pr_owners.contains(&commit.id) {
                    continue;
                }
                let inherited_pr = commit
                    .parents
                    .iter()
                    .find_map(|p| out.commit_to_pr_branch.get(p))
                    .cloned();
                if let Some(branch) = inherited_pr {
                    if out.commit_to_pr_branch.get(&commit.id) != Some(&branch) {
                        out.commit_to_bookmark.remove(&commit.id);
                        out.commit_to_pr_branch.insert(commit.id.clone(), branch);
                        changed = true;
                    }
                    continue;
                }
                let bookmark = match commit.branches.first() {
                    Some(own) => Some(own.clone()),
                    None => commit
                        .parents
                        .iter()
                        .find_map(|p| out.commit_to_bookmark.get(p))
                        .cloned(),
                };
                if let Some(bookmark) = bookmark
                    && out.commit_to_bookmark.get(&commit.id) != Some(&bookmark)
                {
                    out.commit_to_bookmark.insert(commit.id.clone(), bookmark);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        trace!(passes, "pr availability reached fixed point");
        out
    }

    pub fn availability(&self, commit: &Commit) -> PrAvailability {
        if let Some(branch) = self.commit_to_pr_branch.get(&commit.id) {
            return PrAvailability::Update {
                direct: commit.branches.contains(branch),
                branch: branch.clone(),
            };
        }
        if let Some(bookmark) = self.commit_to_bookmark.get(&commit.id) {
            return PrAvailability::Create {
                direct: commit.branches.contains(bookmark),
                bookmark: bookmark.clone(),
            };
        }
        PrAvailability::Unavailable
    }
}

#[cfg(test)]
#[path = "tests/graph_tests.rs"]
mod tests;
