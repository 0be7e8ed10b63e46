use tracing::debug;

use super::{Effect, RefreshMode};
use crate::error::GraftError;
use crate::model::{ChangedFile, Commit, PullRequest, Snapshot, Ticket};

/// The commit whose details are on screen, by logical identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tracked {
    pub change_id: String,
    /// Last commit id seen for the change; disambiguates divergent changes.
    pub commit_id: String,
}

impl Tracked {
    pub fn of(commit: &Commit) -> Self {
        Self {
            change_id: commit.change_id.clone(),
            commit_id: commit.id.clone(),
        }
    }
}

/// Live data mirrored from the repository and the remote services.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    pub snapshot: Snapshot,
    /// Index into `snapshot`; only valid for the snapshot it was derived from.
    pub selected: Option<usize>,
    pub tracked: Option<Tracked>,
    pub changed_files: Vec<ChangedFile>,
    pub pull_requests: Vec<PullRequest>,
    pub tickets: Vec<Ticket>,
    pub status: String,
    pub error: Option<String>,
}

impl Model {
    pub fn selected_commit(&self) -> Option<&Commit> {
        self.selected.and_then(|idx| self.snapshot.get(idx))
    }

    /// Points the selection at `idx` and returns the changed-files fetch for it.
    pub fn select(&mut self, idx: usize) -> Option<Effect> {
        let commit = self.snapshot.get(idx)?;
        let tracked = Tracked::of(commit);
        self.selected = Some(idx);
        if self.tracked.as_ref() == Some(&tracked) {
            return None;
        }
        let effect = changed_files_effect(commit);
        self.tracked = Some(tracked);
        self.changed_files.clear();
        Some(effect)
    }
}

#[derive(Debug)]
pub struct Reconciled {
    pub model: Model,
    pub effects: Vec<Effect>,
    /// False when the snapshot was dropped without touching the model.
    pub applied: bool,
}

fn changed_files_effect(commit: &Commit) -> Effect {
    Effect::LoadChangedFiles {
        change_id: commit.change_id.clone(),
        rev: commit.id.clone(),
    }
}

fn loaded_message(count: usize) -> String {
    match count {
        1 => "Loaded 1 commit".to_string(),
        n => format!("Loaded {n} commits"),
    }
}

/// Merges a freshly fetched snapshot into the model.
///
/// Selection follows the tracked change id to its new position, or is dropped
/// when the change is gone. With nothing tracked, the first commit gets
/// selected. Pull requests, tickets and the error are carried over untouched.
/// A silent refresh is skipped outright while an error is showing.
pub fn reconcile(prev: Model, snapshot: Snapshot, mode: RefreshMode) -> Reconciled {
    if mode == RefreshMode::Silent && prev.error.is_some() {
        debug!("silent refresh skipped while an error is displayed");
        return Reconciled {
            model: prev,
            effects: Vec::new(),
            applied: false,
        };
    }

    let prev_count = prev.snapshot.len();
    let mut effects = Vec::new();
    let mut next = Model {
        snapshot,
        selected: None,
        tracked: None,
        changed_files: Vec::new(),
        pull_requests: prev.pull_requests,
        tickets: prev.tickets,
        status: prev.status,
        error: prev.error,
    };

    match prev.tracked {
        Some(tracked) => {
            match next
                .snapshot
                .find_change(&tracked.change_id, Some(&tracked.commit_id))
            {
                Some(idx) => {
                    let commit = &next.snapshot.commits()[idx];
                    if commit.id == tracked.commit_id {
                        next.changed_files = prev.changed_files;
                    } else {
                        effects.push(changed_files_effect(commit));
                    }
                    next.tracked = Some(Tracked::of(commit));
                    next.selected = Some(idx);
                }
                None => {
                    let lost = GraftError::StaleSelection {
                        change_id: tracked.change_id,
                    };
                    debug!(%lost, "selection reset");
                }
            }
        }
        None => {
            if let Some(effect) = next.select(0) {
                effects.push(effect);
            }
        }
    }

    let count = next.snapshot.len();
    match mode {
        RefreshMode::Loud => next.status = loaded_message(count),
        RefreshMode::Silent => {
            if count != prev_count && next.error.is_none() {
                next.status = loaded_message(count);
            }
        }
    }

    Reconciled {
        model: next,
        effects,
        applied: true,
    }
}

#[cfg(test)]
#[path = "../tests/app/reconcile_tests.rs"]
mod tests;
