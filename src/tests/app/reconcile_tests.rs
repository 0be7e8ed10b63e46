use super::*;
use crate::app::test_support::commit;
use crate::model::{ChangedFile, FileStatus, PrState, PullRequest};

fn snap(commits: Vec<Commit>) -> Snapshot {
    Snapshot::new(commits)
}

fn tracked_model(snapshot: Snapshot, idx: usize) -> Model {
    let mut model = Model {
        snapshot,
        ..Model::default()
    };
    model.select(idx);
    model
}

#[test]
fn selection_follows_change_id_across_index_shift() {
    let s1 = snap(vec![
        commit("a1", "A", &["b1"], &[]),
        commit("b1", "B", &[], &[]),
    ]);
    let prev = tracked_model(s1, 1);

    // B was rewritten (new id) and a new commit landed on top
    let s2 = snap(vec![
        commit("c1", "C", &["a1"], &[]),
        commit("a1", "A", &["b2"], &[]),
        commit("b2", "B", &[], &[]),
    ]);
    let out = reconcile(prev, s2, RefreshMode::Silent);

    assert!(out.applied);
    assert_eq!(out.model.selected, Some(2));
    assert_eq!(out.model.tracked.as_ref().map(|t| t.commit_id.as_str()), Some("b2"));
    assert_eq!(
        out.effects,
        vec![Effect::LoadChangedFiles {
            change_id: "B".into(),
            rev: "b2".into()
        }]
    );
}

#[test]
fn unchanged_commit_keeps_its_changed_files() {
    let s1 = snap(vec![commit("a1", "A", &[], &[])]);
    let mut prev = tracked_model(s1.clone(), 0);
    prev.changed_files = vec![ChangedFile {
        status: FileStatus::Modified,
        path: "src/lib.rs".into(),
    }];

    let out = reconcile(prev, s1, RefreshMode::Loud);
    assert_eq!(out.model.changed_files.len(), 1);
    assert!(out.effects.is_empty());
}

#[test]
fn vanished_change_clears_selection() {
    let s1 = snap(vec![
        commit("a1", "A", &["b1"], &[]),
        commit("b1", "B", &[], &[]),
    ]);
    let prev = tracked_model(s1, 0);

    let s2 = snap(vec![commit("b1", "B", &[], &[])]);
    let out = reconcile(prev, s2, RefreshMode::Loud);

    assert_eq!(out.model.selected, None);
    assert_eq!(out.model.tracked, None);
    assert!(out.model.changed_files.is_empty());
    assert!(out.effects.is_empty());
}

#[test]
fn first_load_selects_top_commit_and_fetches_files() {
    let out = reconcile(
        Model::default(),
        snap(vec![commit("a1", "A", &[], &[])]),
        RefreshMode::Loud,
    );
    assert_eq!(out.model.selected, Some(0));
    assert_eq!(
        out.effects,
        vec![Effect::LoadChangedFiles {
            change_id: "A".into(),
            rev: "a1".into()
        }]
    );
    assert_eq!(out.model.status, "Loaded 1 commit");
}

#[test]
fn remote_lists_survive_graph_refresh() {
    let prev = Model {
        pull_requests: vec![PullRequest {
            number: 7,
            title: "Add feature".into(),
            head_branch: "feature-x".into(),
            base_branch: "main".into(),
            state: PrState::Open,
            url: "https://github.com/o/r/pull/7".into(),
        }],
        tickets: vec![Ticket {
            key: "ENG-1".into(),
            display_key: "ENG-1".into(),
            status: "Todo".into(),
            summary: "Fix".into(),
        }],
        ..Model::default()
    };
    let out = reconcile(prev, snap(vec![commit("a1", "A", &[], &[])]), RefreshMode::Silent);
    assert_eq!(out.model.pull_requests.len(), 1);
    assert_eq!(out.model.tickets.len(), 1);
}

#[test]
fn silent_refresh_updates_status_only_when_count_changes() {
    let s1 = snap(vec![commit("a1", "A", &[], &[])]);
    let prev = Model {
        status: "Squashed".into(),
        ..tracked_model(s1.clone(), 0)
    };
    let out = reconcile(prev, s1, RefreshMode::Silent);
    assert_eq!(out.model.status, "Squashed");

    let out = reconcile(
        out.model,
        snap(vec![
            commit("b1", "B", &["a1"], &[]),
            commit("a1", "A", &[], &[]),
        ]),
        RefreshMode::Silent,
    );
    assert_eq!(out.model.status, "Loaded 2 commits");
}

#[test]
fn silent_refresh_is_skipped_while_error_shows() {
    let prev = Model {
        error: Some("push failed".into()),
        status: "before".into(),
        ..tracked_model(snap(vec![commit("a1", "A", &[], &[])]), 0)
    };
    let out = reconcile(
        prev.clone(),
        snap(vec![
            commit("b1", "B", &["a1"], &[]),
            commit("a1", "A", &[], &[]),
        ]),
        RefreshMode::Silent,
    );
    assert!(!out.applied);
    assert_eq!(out.model, prev);
}

#[test]
fn loud_refresh_runs_through_error_and_keeps_it() {
    let prev = Model {
        error: Some("push failed".into()),
        ..tracked_model(snap(vec![commit("a1", "A", &[], &[])]), 0)
    };
    let out = reconcile(
        prev,
        snap(vec![
            commit("b1", "B", &["a1"], &[]),
            commit("a1", "A", &[], &[]),
        ]),
        RefreshMode::Loud,
    );
    assert!(out.applied);
    assert_eq!(out.model.snapshot.len(), 2);
    assert_eq!(out.model.error.as_deref(), Some("push failed"));
    assert_eq!(out.model.status, "Loaded 2 commits");
}

#[test]
fn divergent_change_prefers_previously_seen_commit() {
    let s1 = snap(vec![
        commit("x1", "D", &[], &[]),
        commit("x2", "D", &[], &[]),
    ]);
    let prev = tracked_model(s1, 1);
    let s2 = snap(vec![
        commit("n1", "N", &["x1"], &[]),
        commit("x1", "D", &[], &[]),
        commit("x2", "D", &[], &[]),
    ]);
    let out = reconcile(prev, s2, RefreshMode::Silent);
    assert_eq!(out.model.selected, Some(2));
}
