//! The interaction engine: one model, one mode, and an `update` function that
//! turns each message into state changes plus the effects to run next.
//!
//! Nothing in here performs IO. The dispatcher runs the returned effects and
//! feeds their single terminal message back through [`App::update`].

use std::fmt::Display;

use tracing::warn;

use crate::graph::{PrActions, PrAvailability, open_pr_branches};
use crate::model::{Commit, PullRequest, Settings, Ticket};

mod forms;
mod input;
mod machine;
mod messages;
mod reconcile;
mod results;
mod scheduler;

pub use self::forms::{
    BookmarkAction, BookmarkForm, DescribeForm, Form, LoginForm, LoginStage, PrField, PrForm,
    SettingKey, SettingsForm, TransitionForm,
};
pub use self::input::Input;
pub use self::machine::validate_bookmark_name;
pub use self::messages::{
    Action, Capabilities, CreatePrPlan, Effect, Msg, Mutation, MutationOutcome, OpKind,
    RefreshMode, RepoStatus, View,
};
pub use self::reconcile::{Model, Reconciled, Tracked, reconcile};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebaseSelect {
    /// Commit id when rebase mode started; only disambiguates divergent changes.
    pub source_id: String,
    pub source_change_id: String,
    pub source_label: String,
    /// Set once a destination was picked and the rebase is running.
    pub dispatched: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    RebaseSelect(RebaseSelect),
    Form(Form),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct PrTimer {
    generation: u64,
    armed: bool,
}

#[derive(Debug)]
pub struct App {
    pub model: Model,
    pub mode: Mode,
    pub view: View,
    pub repo_status: RepoStatus,
    pub pr_cursor: usize,
    pub ticket_cursor: usize,
    pub quit: bool,
    settings: Settings,
    capabilities: Capabilities,
    repo_path: String,
    auto_refresh: bool,
    in_flight: Option<OpKind>,
    /// Mutation epoch at the time the running silent refresh was started.
    silent_refresh: Option<u64>,
    /// Bumped on every finished mutation; older silent snapshots are stale.
    mutation_epoch: u64,
    pr_timer: PrTimer,
}

impl App {
    pub fn new(
        settings: Settings,
        capabilities: Capabilities,
        repo_path: impl Into<String>,
        auto_refresh: bool,
    ) -> Self {
        Self {
            model: Model {
                status: "Loading…".to_string(),
                ..Model::default()
            },
            mode: Mode::Normal,
            view: View::Graph,
            repo_status: RepoStatus::Loading,
            pr_cursor: 0,
            ticket_cursor: 0,
            quit: false,
            settings,
            capabilities,
            repo_path: repo_path.into(),
            auto_refresh,
            in_flight: None,
            silent_refresh: None,
            mutation_epoch: 0,
            pr_timer: PrTimer::default(),
        }
    }

    /// Effects to run once at startup.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = vec![Effect::LoadSnapshot(RefreshMode::Loud)];
        if self.auto_refresh {
            effects.push(Effect::ScheduleTick(self.settings.auto_refresh));
        }
        effects.extend(self.reload_remote_lists());
        effects
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Action(action) => self.on_action(action),
            Msg::Tick => self.on_tick(),
            Msg::PrTick { generation } => self.on_pr_tick(generation),
            other => self.on_result(other),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn repo_path(&self) -> &str {
        &self.repo_path
    }

    pub fn in_flight(&self) -> Option<OpKind> {
        self.in_flight
    }

    pub fn form(&self) -> Option<&Form> {
        match &self.mode {
            Mode::Form(form) => Some(form),
            _ => None,
        }
    }

    /// PR workflow derivation for the current snapshot; never cached.
    pub fn pr_actions(&self) -> PrActions {
        PrActions::derive(
            &self.model.snapshot,
            &open_pr_branches(&self.model.pull_requests),
        )
    }

    pub fn availability(&self, commit: &Commit) -> PrAvailability {
        self.pr_actions().availability(commit)
    }

    pub fn selected_pull_request(&self) -> Option<&PullRequest> {
        self.model.pull_requests.get(self.pr_cursor)
    }

    pub fn selected_ticket(&self) -> Option<&Ticket> {
        self.model.tickets.get(self.ticket_cursor)
    }

    fn reload_remote_lists(&self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.capabilities.hosting {
            effects.push(Effect::LoadPullRequests);
        }
        if self.capabilities.tickets {
            effects.push(Effect::LoadTickets);
        }
        effects
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.model.status = status.into();
    }

    /// Shows a persistent error; silent refreshes stop until it is dismissed.
    fn fail(&mut self, context: &str, err: impl Display) {
        let message = format!("{context}: {err}");
        warn!(%message, "operation failed");
        self.model.error = Some(message);
    }
}
