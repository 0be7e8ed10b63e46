use std::path::PathBuf;

use super::*;
use crate::app::test_support::commit;
use crate::app::{Capabilities, Msg, MutationOutcome, OpKind};
use crate::hosting::{DeviceCode, LoginPoll};
use crate::model::{PrState, PullRequest, Settings, Snapshot, Ticket, Transition};

fn app_with(commits: Vec<Commit>) -> App {
    let mut settings = Settings::default();
    settings.github_client_id = Some("client-123".into());
    let mut app = App::new(
        settings,
        Capabilities {
            hosting: true,
            tickets: true,
        },
        "/repo",
        true,
    );
    app.update(Msg::SnapshotLoaded {
        mode: RefreshMode::Loud,
        result: Ok(Snapshot::new(commits)),
    });
    app
}

fn two_commits() -> App {
    app_with(vec![
        commit("a1", "A", &["b1"], &[]),
        commit("b1", "B", &[], &[]),
    ])
}

fn act(app: &mut App, action: Action) -> Vec<Effect> {
    app.update(Msg::Action(action))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        act(app, Action::Input(c));
    }
}

fn finished(op: OpKind) -> Msg {
    Msg::MutationFinished {
        op,
        result: Ok(MutationOutcome {
            message: format!("{} done", op.label()),
            snapshot: None,
        }),
    }
}

#[test]
fn immutable_commit_refuses_rewrites_before_dispatch() {
    let mut c = commit("a1", "A", &[], &["main"]);
    c.immutable = true;
    let mut app = app_with(vec![c]);

    for action in [
        Action::Edit,
        Action::Squash,
        Action::Abandon,
        Action::StartRebase,
        Action::Describe,
    ] {
        assert!(act(&mut app, action).is_empty(), "{action:?} dispatched");
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.model.status.contains("immutable"), "{}", app.model.status);
    }
    assert_eq!(app.in_flight(), None);
}

#[test]
fn rebase_picks_destination_and_waits_for_result() {
    let mut app = two_commits();
    assert!(act(&mut app, Action::StartRebase).is_empty());
    assert!(matches!(app.mode, Mode::RebaseSelect(_)));

    act(&mut app, Action::MoveDown);
    let effects = act(&mut app, Action::Submit);
    assert_eq!(
        effects,
        vec![Effect::Mutate(Mutation::Rebase {
            source: "A".into(),
            destination: "B".into()
        })]
    );
    assert_eq!(app.in_flight(), Some(OpKind::Rebase));
    assert!(matches!(&app.mode, Mode::RebaseSelect(s) if s.dispatched));

    // nothing else is accepted while the rebase runs
    assert!(act(&mut app, Action::Submit).is_empty());
    assert!(act(&mut app, Action::Cancel).is_empty());

    let effects = app.update(finished(OpKind::Rebase));
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.in_flight(), None);
    assert!(effects.contains(&Effect::LoadSnapshot(RefreshMode::Loud)));
}

#[test]
fn rebase_onto_itself_returns_to_normal_without_mutation() {
    let mut app = two_commits();
    act(&mut app, Action::StartRebase);
    let effects = act(&mut app, Action::Submit);
    assert!(effects.is_empty());
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.model.status, "Cannot rebase a commit onto itself");
    assert_eq!(app.in_flight(), None);
}

fn silent(app: &mut App, commits: Vec<Commit>) -> Vec<Effect> {
    app.update(Msg::SnapshotLoaded {
        mode: RefreshMode::Silent,
        result: Ok(Snapshot::new(commits)),
    })
}

#[test]
fn rebase_onto_itself_is_refused_after_a_refresh_rewrote_the_source() {
    let mut app = two_commits();
    act(&mut app, Action::StartRebase);
    assert!(app.update(Msg::Tick).contains(&Effect::LoadSnapshot(RefreshMode::Silent)));
    silent(
        &mut app,
        vec![commit("a2", "A", &["b1"], &[]), commit("b1", "B", &[], &[])],
    );
    assert!(matches!(app.mode, Mode::RebaseSelect(_)));
    assert_eq!(app.model.selected_commit().map(|c| c.id.as_str()), Some("a2"));

    let effects = act(&mut app, Action::Submit);
    assert!(effects.is_empty(), "{effects:?}");
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.model.status, "Cannot rebase a commit onto itself");
    assert_eq!(app.in_flight(), None);
}

#[test]
fn rebase_after_refresh_sends_the_rewritten_source() {
    let mut app = two_commits();
    act(&mut app, Action::StartRebase);
    app.update(Msg::Tick);
    silent(
        &mut app,
        vec![commit("a2", "A", &["b1"], &[]), commit("b1", "B", &[], &[])],
    );
    act(&mut app, Action::MoveDown);
    assert_eq!(
        act(&mut app, Action::Submit),
        vec![Effect::Mutate(Mutation::Rebase {
            source: "A".into(),
            destination: "B".into()
        })]
    );
}

#[test]
fn rebase_source_gone_after_refresh_cancels_without_mutation() {
    let mut app = two_commits();
    act(&mut app, Action::StartRebase);
    app.update(Msg::Tick);
    silent(&mut app, vec![commit("b1", "B", &[], &[])]);
    act(&mut app, Action::Select(0));

    assert!(act(&mut app, Action::Submit).is_empty());
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(
        app.model.status,
        "Rebase cancelled: change A is no longer in the repository view"
    );
    assert_eq!(app.in_flight(), None);
}

#[test]
fn silent_snapshot_started_before_a_mutation_cannot_undo_it() {
    let mut app = two_commits();
    assert!(app.update(Msg::Tick).contains(&Effect::LoadSnapshot(RefreshMode::Silent)));
    assert_eq!(act(&mut app, Action::NewChild).len(), 1);

    app.update(Msg::MutationFinished {
        op: OpKind::NewChild,
        result: Ok(MutationOutcome {
            message: "new done".into(),
            snapshot: Some(Snapshot::new(vec![
                commit("c1", "C", &["a1"], &[]),
                commit("a1", "A", &["b1"], &[]),
                commit("b1", "B", &[], &[]),
            ])),
        }),
    });
    assert_eq!(app.model.snapshot.len(), 3);

    // the fetch from before the mutation lands last
    let effects = silent(
        &mut app,
        vec![commit("a1", "A", &["b1"], &[]), commit("b1", "B", &[], &[])],
    );
    assert!(effects.is_empty());
    assert_eq!(app.model.snapshot.len(), 3);
    assert_eq!(app.model.status, "new done");

    // and the next tick fetches again
    assert!(app.update(Msg::Tick).contains(&Effect::LoadSnapshot(RefreshMode::Silent)));
}

#[test]
fn failed_side_task_keeps_the_running_mutation() {
    let mut app = two_commits();
    assert_eq!(act(&mut app, Action::Squash).len(), 1);

    app.update(Msg::TaskFailed("clipboard task panicked".into()));
    assert_eq!(app.in_flight(), Some(OpKind::Squash));
    act(&mut app, Action::DismissError);

    assert!(act(&mut app, Action::Abandon).is_empty());
    assert_eq!(app.model.status, "Wait for squash to finish");

    app.update(finished(OpKind::Squash));
    assert_eq!(act(&mut app, Action::Abandon).len(), 1);
}

#[test]
fn interrupted_mutation_settles_like_any_failure() {
    let mut app = two_commits();
    act(&mut app, Action::Describe);
    act(&mut app, Action::Submit);

    let effects = app.update(Msg::MutationFinished {
        op: OpKind::Describe,
        result: Err(GraftError::Interrupted("task panicked".into())),
    });
    assert_eq!(effects, vec![Effect::LoadSnapshot(RefreshMode::Loud)]);
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.in_flight(), None);
    let error = app.model.error.clone().unwrap_or_default();
    assert!(error.contains("background task stopped"), "{error}");
}

#[test]
fn rebase_cancel_dispatches_nothing() {
    let mut app = two_commits();
    act(&mut app, Action::StartRebase);
    act(&mut app, Action::MoveDown);
    assert!(act(&mut app, Action::Cancel).is_empty());
    assert_eq!(app.mode, Mode::Normal);
}

#[test]
fn describe_form_stays_open_until_terminal_message() {
    let mut app = two_commits();
    act(&mut app, Action::Describe);
    type_text(&mut app, "!");
    let effects = act(&mut app, Action::Submit);
    assert_eq!(
        effects,
        vec![Effect::Mutate(Mutation::Describe {
            rev: "A".into(),
            message: "commit a1!".into()
        })]
    );
    assert!(matches!(app.form(), Some(f) if f.is_submitting()));

    // typing into a submitting form does nothing
    type_text(&mut app, "zzz");
    if let Some(Form::Describe(f)) = app.form() {
        assert_eq!(f.message.as_str(), "commit a1!");
    } else {
        panic!("describe form closed early");
    }

    app.update(finished(OpKind::Describe));
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.model.status, "describe done");
}

#[test]
fn cancel_discards_form_buffers() {
    let mut app = two_commits();
    act(&mut app, Action::Describe);
    type_text(&mut app, " more words");
    act(&mut app, Action::Cancel);
    assert_eq!(app.mode, Mode::Normal);

    act(&mut app, Action::Describe);
    let Some(Form::Describe(f)) = app.form() else {
        panic!("describe form not open");
    };
    assert_eq!(f.message.as_str(), "commit a1");
}

#[test]
fn second_mutation_waits_for_first() {
    let mut app = two_commits();
    assert_eq!(act(&mut app, Action::Squash).len(), 1);
    assert!(act(&mut app, Action::Abandon).is_empty());
    assert_eq!(app.model.status, "Wait for squash to finish");

    app.update(finished(OpKind::Squash));
    assert_eq!(act(&mut app, Action::Abandon).len(), 1);
}

#[test]
fn invalid_bookmark_name_is_rejected_locally() {
    let mut app = two_commits();
    act(&mut app, Action::CreateBookmark);
    type_text(&mut app, "bad name");
    assert!(act(&mut app, Action::Submit).is_empty());
    assert!(app.model.status.contains("invalid bookmark name"));
    assert!(matches!(app.form(), Some(f) if !f.is_submitting()));
    assert_eq!(app.model.error, None);
}

#[test]
fn bookmark_name_rules() {
    for ok in ["feature-x", "user/topic", "ENG-42-fix"] {
        assert!(validate_bookmark_name(ok).is_ok(), "{ok}");
    }
    for bad in ["", "has space", "-lead", "a..b", "a~b", "x^", "a:b", "q?", "st*r", "br[", "back\\", "dir/", "x.lock"] {
        assert!(
            matches!(validate_bookmark_name(bad), Err(GraftError::Validation(_))),
            "{bad}"
        );
    }
}

#[test]
fn create_pr_from_inherited_bookmark_plans_move() {
    let mut app = app_with(vec![
        commit("c2", "C2", &["c1"], &[]),
        commit("c1", "C1", &[], &["feature-x"]),
    ]);
    act(&mut app, Action::CreatePr);
    let Some(Form::CreatePr(form)) = app.form() else {
        panic!("create-pr form not open: {}", app.model.status);
    };
    assert!(form.move_bookmark);
    assert_eq!(form.bookmark, "feature-x");

    let effects = act(&mut app, Action::Submit);
    assert_eq!(
        effects,
        vec![Effect::Mutate(Mutation::CreatePr(CreatePrPlan {
            bookmark: "feature-x".into(),
            rev: "C2".into(),
            move_bookmark: true,
            title: "commit c2".into(),
            body: String::new(),
            base: "main".into(),
        }))]
    );
}

#[test]
fn update_pr_targets_open_pr_branch() {
    let mut app = app_with(vec![
        commit("c2", "C2", &["c1"], &[]),
        commit("c1", "C1", &[], &["feature-x"]),
    ]);
    app.update(Msg::PullRequestsLoaded(Ok(vec![PullRequest {
        number: 3,
        title: "Feature".into(),
        head_branch: "feature-x".into(),
        base_branch: "main".into(),
        state: PrState::Open,
        url: "https://github.com/o/r/pull/3".into(),
    }])));

    // an open PR means update, not create
    assert!(act(&mut app, Action::CreatePr).is_empty());
    assert_eq!(app.mode, Mode::Normal);

    let effects = act(&mut app, Action::UpdatePr);
    assert_eq!(
        effects,
        vec![Effect::Mutate(Mutation::UpdatePr {
            bookmark: "feature-x".into(),
            rev: "C2".into(),
            move_first: true
        })]
    );
}

#[test]
fn late_result_leaves_newer_form_alone() {
    let mut app = two_commits();
    act(&mut app, Action::Describe);
    act(&mut app, Action::Submit);
    act(&mut app, Action::Cancel);
    assert_eq!(app.in_flight(), Some(OpKind::Describe));

    act(&mut app, Action::CreateBookmark);
    app.update(finished(OpKind::Describe));
    assert!(matches!(app.form(), Some(Form::Bookmark(_))));
    assert_eq!(app.in_flight(), None);
}

#[test]
fn failure_shows_error_until_dismissed_or_retried() {
    let mut app = two_commits();
    act(&mut app, Action::Squash);
    let effects = app.update(Msg::MutationFinished {
        op: OpKind::Squash,
        result: Err(GraftError::ExternalTool {
            command: "jj squash".into(),
            message: "Error: nothing to squash".into(),
        }),
    });
    assert_eq!(effects, vec![Effect::LoadSnapshot(RefreshMode::Loud)]);
    let error = app.model.error.clone().expect("error set");
    assert!(error.contains("nothing to squash"));

    // ordinary actions are swallowed by the banner
    assert!(act(&mut app, Action::Abandon).is_empty());
    assert_eq!(act(&mut app, Action::CopyError), vec![Effect::CopyToClipboard(error)]);

    let effects = act(&mut app, Action::RetryError);
    assert_eq!(app.model.error, None);
    assert_eq!(
        effects,
        vec![
            Effect::LoadSnapshot(RefreshMode::Loud),
            Effect::LoadPullRequests,
            Effect::LoadTickets
        ]
    );
}

#[test]
fn unmanaged_path_offers_init() {
    let mut app = App::new(Settings::default(), Capabilities::default(), "/tmp/x", true);
    app.update(Msg::SnapshotLoaded {
        mode: RefreshMode::Loud,
        result: Err(GraftError::NotManagedRepository {
            path: PathBuf::from("/tmp/x"),
        }),
    });
    assert_eq!(
        app.repo_status,
        RepoStatus::NotManaged {
            path: "/tmp/x".into()
        }
    );
    assert_eq!(app.model.error, None);
    assert!(act(&mut app, Action::Edit).is_empty());
    assert_eq!(
        act(&mut app, Action::InitRepo),
        vec![Effect::Mutate(Mutation::InitRepo)]
    );
}

#[test]
fn ticket_transition_flow() {
    let mut app = two_commits();
    app.update(Msg::TicketsLoaded(Ok(vec![Ticket {
        key: "10001".into(),
        display_key: "ENG-7".into(),
        status: "To Do".into(),
        summary: "Fix login".into(),
    }])));
    assert_eq!(act(&mut app, Action::ShowView(View::Tickets)), vec![Effect::LoadTickets]);

    assert_eq!(
        act(&mut app, Action::TicketTransitions),
        vec![Effect::LoadTransitions {
            key: "10001".into()
        }]
    );
    app.update(Msg::TransitionsLoaded {
        key: "10001".into(),
        result: Ok(vec![
            Transition {
                id: "11".into(),
                name: "In Progress".into(),
            },
            Transition {
                id: "31".into(),
                name: "Done".into(),
            },
        ]),
    });
    act(&mut app, Action::MoveDown);
    assert_eq!(
        act(&mut app, Action::Submit),
        vec![Effect::Mutate(Mutation::TicketTransition {
            key: "10001".into(),
            transition_id: "31".into(),
            name: "Done".into()
        })]
    );

    let effects = app.update(finished(OpKind::TicketTransition));
    assert_eq!(app.mode, Mode::Normal);
    assert!(effects.contains(&Effect::LoadTickets));
}

#[test]
fn bookmark_from_ticket_prefills_name() {
    let mut app = two_commits();
    app.update(Msg::TicketsLoaded(Ok(vec![Ticket {
        key: "10001".into(),
        display_key: "ENG-7".into(),
        status: "To Do".into(),
        summary: "Fix login".into(),
    }])));
    act(&mut app, Action::ShowView(View::Tickets));
    act(&mut app, Action::BookmarkFromTicket);
    let Some(Form::Bookmark(form)) = app.form() else {
        panic!("bookmark form not open");
    };
    assert_eq!(form.action, BookmarkAction::Create);
    assert_eq!(form.name.as_str(), "eng-7-fix-login");
}

#[test]
fn login_polls_until_granted_then_saves_token() {
    let mut app = two_commits();
    assert_eq!(
        act(&mut app, Action::Login),
        vec![Effect::StartLogin {
            client_id: "client-123".into()
        }]
    );
    let effects = app.update(Msg::LoginStarted(Ok(DeviceCode {
        device_code: "dev".into(),
        user_code: "ABCD-1234".into(),
        verification_uri: "https://github.com/login/device".into(),
        interval: 5,
        expires_in: 900,
    })));
    assert_eq!(
        effects,
        vec![Effect::PollLogin {
            client_id: "client-123".into(),
            device_code: "dev".into(),
            after: std::time::Duration::from_secs(5)
        }]
    );
    assert!(app.model.status.contains("ABCD-1234"));

    let effects = app.update(Msg::LoginPolled(Ok(LoginPoll::Pending { slow_down: true })));
    assert_eq!(
        effects,
        vec![Effect::PollLogin {
            client_id: "client-123".into(),
            device_code: "dev".into(),
            after: std::time::Duration::from_secs(10)
        }]
    );

    let effects = app.update(Msg::LoginPolled(Ok(LoginPoll::Granted("gho_x".into()))));
    assert_eq!(
        effects,
        vec![Effect::SaveConfig(FileConfig {
            github_token: Some("gho_x".into()),
            ..FileConfig::default()
        })]
    );

    let mut saved = app.settings().clone();
    saved.github_token = Some("gho_x".into());
    let effects = app.update(Msg::ConfigSaved(Ok(saved.clone())));
    assert_eq!(effects, vec![Effect::Reconfigure(saved)]);
    assert_eq!(app.mode, Mode::Normal);
    assert_eq!(app.model.status, "Signed in to GitHub");
}

#[test]
fn cancelled_login_ignores_late_polls() {
    let mut app = two_commits();
    act(&mut app, Action::Login);
    act(&mut app, Action::Cancel);
    let effects = app.update(Msg::LoginPolled(Ok(LoginPoll::Granted("gho_x".into()))));
    assert!(effects.is_empty());
    assert_eq!(app.mode, Mode::Normal);
}
