use super::*;
use crossterm::event::{KeyEventState, MouseEvent};

use crate::app::{Capabilities, Msg, RefreshMode};
use crate::model::{Commit, Settings, Snapshot};

fn press(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: mods,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    }
}

fn click(column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

#[test]
fn no_duplicate_bindings_within_a_scope() {
    for (i, a) in BINDINGS.iter().enumerate() {
        for b in &BINDINGS[i + 1..] {
            assert!(
                !(a.scope == b.scope && a.code == b.code && a.mods == b.mods),
                "{:?} {:?} bound twice",
                a.scope,
                a.code
            );
        }
    }
}

#[test]
fn graph_keys_fall_back_to_global() {
    assert_eq!(
        resolve_key(Scope::Graph, press(KeyCode::Char('r'), KeyModifiers::NONE)),
        Some(Action::StartRebase)
    );
    assert_eq!(
        resolve_key(Scope::Graph, press(KeyCode::Down, KeyModifiers::NONE)),
        Some(Action::MoveDown)
    );
    // shifted letters arrive with SHIFT set
    assert_eq!(
        resolve_key(Scope::Graph, press(KeyCode::Char('U'), KeyModifiers::SHIFT)),
        Some(Action::UpdatePr)
    );
}

#[test]
fn error_scope_shadows_everything_else() {
    assert_eq!(
        resolve_key(Scope::Error, press(KeyCode::Char('r'), KeyModifiers::NONE)),
        Some(Action::RetryError)
    );
    assert_eq!(
        resolve_key(Scope::Error, press(KeyCode::Char('e'), KeyModifiers::NONE)),
        None
    );
}

#[test]
fn form_scope_types_letters() {
    assert_eq!(
        resolve_key(Scope::Form, press(KeyCode::Char('q'), KeyModifiers::NONE)),
        Some(Action::Input('q'))
    );
    assert_eq!(
        resolve_key(Scope::Form, press(KeyCode::Enter, KeyModifiers::ALT)),
        Some(Action::Newline)
    );
    assert_eq!(
        resolve_key(Scope::Form, press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Some(Action::Quit)
    );
}

#[test]
fn clicks_use_latest_region() {
    let mut hits = HitMap::default();
    hits.push(Rect::new(0, 0, 40, 10), Action::Select(0));
    hits.push(Rect::new(10, 2, 10, 1), Action::DismissError);
    assert_eq!(translate(Scope::Graph, &hits, &click(12, 2)), vec![Action::DismissError]);
    assert_eq!(translate(Scope::Graph, &hits, &click(1, 1)), vec![Action::Select(0)]);
    assert!(translate(Scope::Graph, &hits, &click(50, 50)).is_empty());
}

#[test]
fn paste_types_into_forms_only() {
    let hits = HitMap::default();
    let paste = Event::Paste("a\r\nb".into());
    assert_eq!(
        translate(Scope::Form, &hits, &paste),
        vec![Action::Input('a'), Action::Newline, Action::Input('b')]
    );
    assert!(translate(Scope::Graph, &hits, &paste).is_empty());
}

#[test]
fn scope_tracks_app_state() {
    let mut app = App::new(Settings::default(), Capabilities::default(), "/repo", false);
    app.update(Msg::SnapshotLoaded {
        mode: RefreshMode::Loud,
        result: Ok(Snapshot::new(vec![Commit {
            id: "a1".into(),
            change_id: "A".into(),
            ..Commit::default()
        }])),
    });
    assert_eq!(scope_for(&app), Scope::Graph);
    app.update(Msg::Action(Action::StartRebase));
    assert_eq!(scope_for(&app), Scope::Rebase);
    app.model.error = Some("boom".into());
    assert_eq!(scope_for(&app), Scope::Error);
}

#[test]
fn hints_include_global_entries_for_graph() {
    let graph = hints(Scope::Graph);
    assert!(graph.iter().any(|(k, h)| k == "e" && *h == "edit"));
    assert!(graph.iter().any(|(k, h)| k == "q" && *h == "quit"));
    assert!(!hints(Scope::Form).iter().any(|(_, h)| *h == "quit"));
}
