use tracing::debug;

use super::forms::{Form, LoginStage};
use super::{App, Effect, Mode, Msg, MutationOutcome, OpKind, RefreshMode, RepoStatus, reconcile};
use crate::error::GraftError;
use crate::hosting::{DeviceCode, LoginPoll};
use crate::model::{FileConfig, Settings, Snapshot};

/// Extra seconds GitHub asks for on `slow_down`.
const SLOW_DOWN_STEP: u64 = 5;

impl App {
    pub(super) fn on_result(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::SnapshotLoaded { mode, result } => self.on_snapshot(mode, result),
            Msg::ChangedFilesLoaded { change_id, result } => {
                let current = self.model.tracked.as_ref().map(|t| t.change_id.as_str());
                if current != Some(change_id.as_str()) {
                    debug!(%change_id, "changed files for a deselected commit dropped");
                    return Vec::new();
                }
                match result {
                    Ok(files) => self.model.changed_files = files,
                    Err(err) => self.set_status(format!("Could not list changed files: {err}")),
                }
                Vec::new()
            }
            Msg::PullRequestsLoaded(result) => {
                match result {
                    Ok(prs) => {
                        self.model.pull_requests = prs;
                        self.pr_cursor = clamp(self.pr_cursor, self.model.pull_requests.len());
                    }
                    Err(err) => self.fail("Loading pull requests failed", err),
                }
                Vec::new()
            }
            Msg::TicketsLoaded(result) => {
                match result {
                    Ok(tickets) => {
                        self.model.tickets = tickets;
                        self.ticket_cursor = clamp(self.ticket_cursor, self.model.tickets.len());
                    }
                    Err(err) => self.fail("Loading tickets failed", err),
                }
                Vec::new()
            }
            Msg::TransitionsLoaded { key, result } => {
                let Mode::Form(Form::TicketTransition(form)) = &mut self.mode else {
                    return Vec::new();
                };
                if form.ticket.key != key {
                    return Vec::new();
                }
                match result {
                    Ok(list) => {
                        let empty = list.is_empty();
                        form.transitions = Some(list);
                        form.cursor = 0;
                        if empty {
                            self.set_status("No status changes available for this ticket");
                        }
                    }
                    Err(err) => {
                        self.mode = Mode::Normal;
                        self.fail("Loading ticket statuses failed", err);
                    }
                }
                Vec::new()
            }
            Msg::MutationFinished { op, result } => self.on_mutation_finished(op, result),
            Msg::LoginStarted(result) => self.on_login_started(result),
            Msg::LoginPolled(result) => self.on_login_polled(result),
            Msg::ConfigSaved(result) => self.on_config_saved(result),
            Msg::Reconfigured {
                capabilities,
                error,
            } => {
                self.capabilities = capabilities;
                if let Some(err) = error {
                    self.fail("Reconfiguring services failed", err);
                }
                if !capabilities.hosting {
                    self.model.pull_requests.clear();
                }
                if !capabilities.tickets {
                    self.model.tickets.clear();
                }
                let mut effects = self.reload_remote_lists();
                if self.view == super::View::PullRequests {
                    effects.extend(self.arm_pr_timer());
                }
                effects
            }
            Msg::Copied(result) => {
                match result {
                    Ok(what) => self.set_status(format!("Copied {what}")),
                    Err(err) => self.set_status(format!("Clipboard unavailable: {err}")),
                }
                Vec::new()
            }
            // Tasks that own engine state report their own terminal message
            // even when they die, so nothing here is reset.
            Msg::TaskFailed(message) => {
                self.fail("Background task failed", message);
                Vec::new()
            }
            Msg::Action(_) | Msg::Tick | Msg::PrTick { .. } => Vec::new(),
        }
    }

    fn on_snapshot(&mut self, mode: RefreshMode, result: Result<Snapshot, GraftError>) -> Vec<Effect> {
        if mode == RefreshMode::Silent {
            let started = self.silent_refresh.take();
            if started.is_some_and(|epoch| epoch != self.mutation_epoch) {
                debug!("silent snapshot predates the last mutation; dropped");
                return Vec::new();
            }
            if matches!(self.mode, Mode::Form(_)) {
                debug!("silent snapshot dropped while a form is open");
                return Vec::new();
            }
        }
        match result {
            Ok(snapshot) => self.apply_snapshot(snapshot, mode),
            Err(GraftError::NotManagedRepository { path }) => {
                self.repo_status = RepoStatus::NotManaged {
                    path: path.display().to_string(),
                };
                self.set_status("Not a jj repository");
                Vec::new()
            }
            Err(err) => {
                self.fail("Refresh failed", err);
                Vec::new()
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot, mode: RefreshMode) -> Vec<Effect> {
        let prev = std::mem::take(&mut self.model);
        let reconciled = reconcile(prev, snapshot, mode);
        self.model = reconciled.model;
        if reconciled.applied {
            self.repo_status = RepoStatus::Ready;
        }
        reconciled.effects
    }

    fn on_mutation_finished(
        &mut self,
        op: OpKind,
        result: Result<MutationOutcome, GraftError>,
    ) -> Vec<Effect> {
        self.mutation_epoch += 1;
        if self.in_flight == Some(op) {
            self.in_flight = None;
        }
        let waiting = match &self.mode {
            Mode::Form(form) => form.pending_op() == Some(op),
            Mode::RebaseSelect(select) => select.dispatched && op == OpKind::Rebase,
            Mode::Normal => false,
        };
        if waiting {
            self.mode = Mode::Normal;
        } else {
            debug!(op = op.label(), "result arrived after its form was closed");
        }

        match result {
            Ok(outcome) => {
                let mut effects = match outcome.snapshot {
                    Some(snapshot) => self.apply_snapshot(snapshot, RefreshMode::Loud),
                    None => vec![Effect::LoadSnapshot(RefreshMode::Loud)],
                };
                self.set_status(outcome.message);
                match op {
                    OpKind::CreatePr
                    | OpKind::UpdatePr
                    | OpKind::BookmarkMove
                    | OpKind::BookmarkDelete
                    | OpKind::GitFetch
                        if self.capabilities.hosting =>
                    {
                        effects.push(Effect::LoadPullRequests)
                    }
                    OpKind::TicketTransition => effects.push(Effect::LoadTickets),
                    OpKind::InitRepo => effects.extend(self.reload_remote_lists()),
                    _ => {}
                }
                effects
            }
            Err(err) => {
                self.fail(&format!("{} failed", op.label()), err);
                vec![Effect::LoadSnapshot(RefreshMode::Loud)]
            }
        }
    }

    fn on_login_started(&mut self, result: Result<DeviceCode, GraftError>) -> Vec<Effect> {
        let Mode::Form(Form::Login(form)) = &mut self.mode else {
            return Vec::new();
        };
        if form.stage != LoginStage::RequestingCode {
            return Vec::new();
        }
        match result {
            Ok(code) => {
                let effect = Effect::PollLogin {
                    client_id: form.client_id.clone(),
                    device_code: code.device_code.clone(),
                    after: code.poll_interval(),
                };
                let status = format!("Open {} and enter {}", code.verification_uri, code.user_code);
                form.stage = LoginStage::WaitingForUser(code);
                self.set_status(status);
                vec![effect]
            }
            Err(err) => {
                self.mode = Mode::Normal;
                self.fail("GitHub sign-in failed", err);
                Vec::new()
            }
        }
    }

    fn on_login_polled(&mut self, result: Result<LoginPoll, GraftError>) -> Vec<Effect> {
        let Mode::Form(Form::Login(form)) = &mut self.mode else {
            return Vec::new();
        };
        let LoginStage::WaitingForUser(code) = &mut form.stage else {
            return Vec::new();
        };
        match result {
            Ok(LoginPoll::Pending { slow_down }) => {
                if slow_down {
                    code.interval += SLOW_DOWN_STEP;
                }
                vec![Effect::PollLogin {
                    client_id: form.client_id.clone(),
                    device_code: code.device_code.clone(),
                    after: code.poll_interval(),
                }]
            }
            Ok(LoginPoll::Granted(token)) => {
                form.stage = LoginStage::Saving;
                self.set_status("Signed in; saving token…");
                vec![Effect::SaveConfig(FileConfig {
                    github_token: Some(token),
                    ..FileConfig::default()
                })]
            }
            Err(err) => {
                self.mode = Mode::Normal;
                self.fail("GitHub sign-in failed", err);
                Vec::new()
            }
        }
    }

    fn on_config_saved(&mut self, result: Result<Settings, String>) -> Vec<Effect> {
        let closing = match &self.mode {
            Mode::Form(Form::Settings(f)) => f.submitting.then_some("Settings saved"),
            Mode::Form(Form::Login(f)) => {
                (f.stage == LoginStage::Saving).then_some("Signed in to GitHub")
            }
            _ => None,
        };
        if closing.is_some() {
            self.mode = Mode::Normal;
        }
        match result {
            Ok(settings) => {
                self.settings = settings.clone();
                self.set_status(closing.unwrap_or("Settings saved"));
                vec![Effect::Reconfigure(settings)]
            }
            Err(err) => {
                self.fail("Saving settings failed", err);
                Vec::new()
            }
        }
    }
}

fn clamp(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}
