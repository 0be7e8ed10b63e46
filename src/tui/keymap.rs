//! Keys and clicks resolve to the same [`Action`]s through one table.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::app::{Action, App, Mode, RepoStatus, View};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Navigation, view switching, quit. Consulted after Graph, List and Rebase.
    Global,
    Graph,
    List,
    Rebase,
    Form,
    Error,
    Onboarding,
}

#[derive(Clone, Copy, Debug)]
pub struct Binding {
    pub scope: Scope,
    pub code: KeyCode,
    pub mods: KeyModifiers,
    pub action: Action,
    /// Shown in the footer when set.
    pub help: Option<&'static str>,
}

const fn key(scope: Scope, c: char, action: Action, help: Option<&'static str>) -> Binding {
    Binding {
        scope,
        code: KeyCode::Char(c),
        mods: KeyModifiers::NONE,
        action,
        help,
    }
}

const fn special(scope: Scope, code: KeyCode, mods: KeyModifiers, action: Action, help: Option<&'static str>) -> Binding {
    Binding {
        scope,
        code,
        mods,
        action,
        help,
    }
}

const NONE: KeyModifiers = KeyModifiers::NONE;
const CTRL: KeyModifiers = KeyModifiers::CONTROL;
const ALT: KeyModifiers = KeyModifiers::ALT;

pub const BINDINGS: &[Binding] = &[
    special(Scope::Global, KeyCode::Char('c'), CTRL, Action::Quit, None),
    key(Scope::Global, 'q', Action::Quit, Some("quit")),
    special(Scope::Global, KeyCode::Up, NONE, Action::MoveUp, None),
    special(Scope::Global, KeyCode::Down, NONE, Action::MoveDown, None),
    key(Scope::Global, 'k', Action::MoveUp, None),
    key(Scope::Global, 'j', Action::MoveDown, None),
    special(Scope::Global, KeyCode::Home, NONE, Action::Top, None),
    special(Scope::Global, KeyCode::End, NONE, Action::Bottom, None),
    key(Scope::Global, 'g', Action::Top, None),
    key(Scope::Global, 'G', Action::Bottom, None),
    key(Scope::Global, 'R', Action::Refresh, Some("refresh")),
    special(Scope::Global, KeyCode::F(5), NONE, Action::Refresh, None),
    special(Scope::Global, KeyCode::Tab, NONE, Action::NextView, Some("next view")),
    key(Scope::Global, '1', Action::ShowView(View::Graph), None),
    key(Scope::Global, '2', Action::ShowView(View::PullRequests), None),
    key(Scope::Global, '3', Action::ShowView(View::Tickets), None),
    key(Scope::Global, ',', Action::OpenSettings, Some("settings")),
    key(Scope::Global, 'L', Action::Login, None),
    key(Scope::Graph, 'e', Action::Edit, Some("edit")),
    key(Scope::Graph, 'n', Action::NewChild, Some("new")),
    key(Scope::Graph, 'd', Action::Describe, Some("describe")),
    key(Scope::Graph, 's', Action::Squash, Some("squash")),
    key(Scope::Graph, 'a', Action::Abandon, Some("abandon")),
    key(Scope::Graph, 'r', Action::StartRebase, Some("rebase")),
    key(Scope::Graph, 'b', Action::CreateBookmark, Some("bookmark")),
    key(Scope::Graph, 'm', Action::MoveBookmark, None),
    key(Scope::Graph, 'D', Action::DeleteBookmark, None),
    key(Scope::Graph, 'p', Action::CreatePr, Some("PR")),
    key(Scope::Graph, 'U', Action::UpdatePr, Some("push PR")),
    key(Scope::Graph, 'f', Action::GitFetch, None),
    special(Scope::List, KeyCode::Enter, NONE, Action::Submit, None),
    key(Scope::List, 't', Action::TicketTransitions, Some("status")),
    key(Scope::List, 'b', Action::BookmarkFromTicket, Some("bookmark")),
    key(Scope::List, 'y', Action::CopyUrl, Some("copy url")),
    special(Scope::Rebase, KeyCode::Enter, NONE, Action::Submit, Some("rebase here")),
    special(Scope::Rebase, KeyCode::Esc, NONE, Action::Cancel, Some("cancel")),
    special(Scope::Form, KeyCode::Char('c'), CTRL, Action::Quit, None),
    special(Scope::Form, KeyCode::Esc, NONE, Action::Cancel, Some("cancel")),
    special(Scope::Form, KeyCode::Enter, NONE, Action::Submit, Some("submit")),
    special(Scope::Form, KeyCode::Enter, ALT, Action::Newline, Some("newline")),
    special(Scope::Form, KeyCode::Tab, NONE, Action::NextField, Some("next field")),
    special(Scope::Form, KeyCode::BackTab, NONE, Action::PrevField, None),
    special(Scope::Form, KeyCode::Up, NONE, Action::MoveUp, None),
    special(Scope::Form, KeyCode::Down, NONE, Action::MoveDown, None),
    special(Scope::Form, KeyCode::Backspace, NONE, Action::Backspace, None),
    special(Scope::Form, KeyCode::Delete, NONE, Action::Delete, None),
    special(Scope::Form, KeyCode::Left, NONE, Action::Left, None),
    special(Scope::Form, KeyCode::Right, NONE, Action::Right, None),
    special(Scope::Error, KeyCode::Esc, NONE, Action::DismissError, Some("dismiss")),
    key(Scope::Error, 'r', Action::RetryError, Some("retry")),
    key(Scope::Error, 'c', Action::CopyError, Some("copy")),
    key(Scope::Error, 'q', Action::Quit, Some("quit")),
    special(Scope::Error, KeyCode::Char('c'), CTRL, Action::Quit, None),
    key(Scope::Onboarding, 'i', Action::InitRepo, Some("init jj repo")),
    key(Scope::Onboarding, 'R', Action::Refresh, Some("refresh")),
    key(Scope::Onboarding, 'q', Action::Quit, Some("quit")),
    special(Scope::Onboarding, KeyCode::Char('c'), CTRL, Action::Quit, None),
];

pub fn scope_for(app: &App) -> Scope {
    if app.model.error.is_some() {
        return Scope::Error;
    }
    if matches!(app.repo_status, RepoStatus::NotManaged { .. }) {
        return Scope::Onboarding;
    }
    match &app.mode {
        Mode::Form(_) => Scope::Form,
        Mode::RebaseSelect(_) => Scope::Rebase,
        Mode::Normal if app.view == View::Graph => Scope::Graph,
        Mode::Normal => Scope::List,
    }
}

fn falls_back_to_global(scope: Scope) -> bool {
    matches!(scope, Scope::Graph | Scope::List | Scope::Rebase)
}

fn lookup(scope: Scope, code: KeyCode, mods: KeyModifiers) -> Option<Action> {
    BINDINGS
        .iter()
        .find(|b| b.scope == scope && b.code == code && b.mods == mods)
        .map(|b| b.action)
}

pub fn resolve_key(scope: Scope, key: KeyEvent) -> Option<Action> {
    let mut mods = key.modifiers;
    // Shifted characters arrive already upper-cased.
    if matches!(key.code, KeyCode::Char(_)) {
        mods.remove(KeyModifiers::SHIFT);
    }
    if let Some(action) = lookup(scope, key.code, mods) {
        return Some(action);
    }
    if falls_back_to_global(scope)
        && let Some(action) = lookup(Scope::Global, key.code, mods)
    {
        return Some(action);
    }
    match (scope, key.code) {
        (Scope::Form, KeyCode::Char(c)) if !mods.intersects(CTRL | ALT) => Some(Action::Input(c)),
        _ => None,
    }
}

/// Footer hints for a scope, as (key, help) pairs.
pub fn hints(scope: Scope) -> Vec<(String, &'static str)> {
    let mut scopes = vec![scope];
    if falls_back_to_global(scope) {
        scopes.push(Scope::Global);
    }
    scopes
        .into_iter()
        .flat_map(|s| BINDINGS.iter().filter(move |b| b.scope == s))
        .filter_map(|b| b.help.map(|help| (key_label(b.code, b.mods), help)))
        .collect()
}

fn key_label(code: KeyCode, mods: KeyModifiers) -> String {
    let base = match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        other => format!("{other:?}"),
    };
    if mods.contains(ALT) {
        format!("Alt+{base}")
    } else if mods.contains(CTRL) {
        format!("Ctrl+{base}")
    } else {
        base
    }
}

/// Clickable regions recorded by the renderer on each frame.
#[derive(Debug, Default)]
pub struct HitMap {
    regions: Vec<(Rect, Action)>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn push(&mut self, area: Rect, action: Action) {
        self.regions.push((area, action));
    }

    /// The most recently drawn region under the point wins.
    pub fn action_at(&self, column: u16, row: u16) -> Option<Action> {
        let pos = Position::new(column, row);
        self.regions
            .iter()
            .rev()
            .find(|(area, _)| area.contains(pos))
            .map(|(_, action)| *action)
    }
}

pub fn translate(scope: Scope, hits: &HitMap, event: &Event) -> Vec<Action> {
    match event {
        Event::Key(k) if k.kind == KeyEventKind::Press => resolve_key(scope, *k).into_iter().collect(),
        Event::Mouse(m) => match m.kind {
            MouseEventKind::Down(MouseButton::Left) => hits.action_at(m.column, m.row).into_iter().collect(),
            MouseEventKind::ScrollUp => vec![Action::MoveUp],
            MouseEventKind::ScrollDown => vec![Action::MoveDown],
            _ => Vec::new(),
        },
        Event::Paste(text) if scope == Scope::Form => text
            .chars()
            .filter(|c| *c != '\r')
            .map(|c| if c == '\n' { Action::Newline } else { Action::Input(c) })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "../tests/tui/keymap_tests.rs"]
mod tests;
