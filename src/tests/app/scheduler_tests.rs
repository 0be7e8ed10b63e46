use std::time::Duration;

use super::*;
use crate::app::test_support::commit;
use crate::app::{Action, Capabilities, Mode, Msg};
use crate::model::{Settings, Snapshot};

fn ready_app() -> App {
    let mut app = App::new(
        Settings::default(),
        Capabilities {
            hosting: true,
            tickets: false,
        },
        "/repo",
        true,
    );
    app.update(Msg::SnapshotLoaded {
        mode: RefreshMode::Loud,
        result: Ok(Snapshot::new(vec![commit("a1", "A", &[], &[])])),
    });
    app
}

const EVERY_3S: Effect = Effect::ScheduleTick(Duration::from_secs(3));

#[test]
fn tick_requests_silent_refresh_and_reschedules() {
    let mut app = ready_app();
    assert_eq!(
        app.update(Msg::Tick),
        vec![EVERY_3S, Effect::LoadSnapshot(RefreshMode::Silent)]
    );
    // still waiting on the first one
    assert_eq!(app.update(Msg::Tick), vec![EVERY_3S]);

    app.update(Msg::SnapshotLoaded {
        mode: RefreshMode::Silent,
        result: Ok(Snapshot::new(vec![commit("a1", "A", &[], &[])])),
    });
    assert_eq!(app.update(Msg::Tick).len(), 2);
}

#[test]
fn error_suppresses_tick_but_keeps_cadence() {
    let mut app = ready_app();
    app.model.error = Some("fetch failed".into());
    assert_eq!(app.update(Msg::Tick), vec![EVERY_3S]);
    assert_eq!(app.model.error.as_deref(), Some("fetch failed"));
    assert_eq!(app.model.snapshot.len(), 1);
}

#[test]
fn open_form_suppresses_tick() {
    let mut app = ready_app();
    app.update(Msg::Action(Action::Describe));
    assert_eq!(app.update(Msg::Tick), vec![EVERY_3S]);
}

#[test]
fn snapshot_already_in_flight_is_dropped_once_a_form_opens() {
    let mut app = ready_app();
    assert!(app.update(Msg::Tick).contains(&Effect::LoadSnapshot(RefreshMode::Silent)));
    app.update(Msg::Action(Action::Describe));
    assert!(matches!(app.mode, Mode::Form(_)));

    let effects = app.update(Msg::SnapshotLoaded {
        mode: RefreshMode::Silent,
        result: Ok(Snapshot::new(vec![
            commit("c1", "C", &["a1"], &[]),
            commit("a1", "A", &[], &[]),
        ])),
    });
    assert!(effects.is_empty());
    assert_eq!(app.model.snapshot.len(), 1);
    assert_eq!(app.model.selected, Some(0));

    // the slot is free again once the form is gone
    app.update(Msg::Action(Action::Cancel));
    assert_eq!(
        app.update(Msg::Tick),
        vec![EVERY_3S, Effect::LoadSnapshot(RefreshMode::Silent)]
    );
}

#[test]
fn running_mutation_suppresses_tick() {
    let mut app = ready_app();
    assert_eq!(app.update(Msg::Action(Action::NewChild)).len(), 1);
    assert_eq!(app.update(Msg::Tick), vec![EVERY_3S]);
}

#[test]
fn disabled_auto_refresh_never_ticks() {
    let mut app = App::new(Settings::default(), Capabilities::default(), "/repo", false);
    assert_eq!(app.start(), vec![Effect::LoadSnapshot(RefreshMode::Loud)]);
    assert!(app.update(Msg::Tick).is_empty());
}

#[test]
fn pr_timer_runs_only_while_pr_view_is_shown() {
    let mut app = ready_app();
    let every_30s = Duration::from_secs(30);

    assert_eq!(
        app.update(Msg::Action(Action::ShowView(View::PullRequests))),
        vec![
            Effect::LoadPullRequests,
            Effect::SchedulePrTick {
                generation: 1,
                after: every_30s
            }
        ]
    );
    assert_eq!(
        app.update(Msg::PrTick { generation: 1 }),
        vec![
            Effect::SchedulePrTick {
                generation: 1,
                after: every_30s
            },
            Effect::LoadPullRequests
        ]
    );

    app.update(Msg::Action(Action::ShowView(View::Graph)));
    assert!(app.update(Msg::PrTick { generation: 1 }).is_empty());

    // re-entering starts a new timer; the old one stays dead
    app.update(Msg::Action(Action::ShowView(View::PullRequests)));
    assert!(app.update(Msg::PrTick { generation: 1 }).is_empty());
    assert_eq!(app.update(Msg::PrTick { generation: 3 }).len(), 2);
}

#[test]
fn pr_timer_disabled_by_zero_interval() {
    let mut settings = Settings::default();
    settings.pr_refresh = None;
    let mut app = App::new(
        settings,
        Capabilities {
            hosting: true,
            tickets: false,
        },
        "/repo",
        true,
    );
    assert_eq!(
        app.update(Msg::Action(Action::ShowView(View::PullRequests))),
        vec![Effect::LoadPullRequests]
    );
}
