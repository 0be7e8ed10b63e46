use super::forms::{
    BookmarkAction, BookmarkForm, DescribeForm, Form, LoginForm, LoginStage, PrField, PrForm,
    SettingsForm, TransitionForm,
};
use super::input::Input;
use super::{
    Action, App, CreatePrPlan, Effect, Mode, Mutation, RebaseSelect, RefreshMode, RepoStatus, View,
};
use crate::error::GraftError;
use crate::graph::PrAvailability;
use crate::model::{Commit, FileConfig};
use crate::tickets::bookmark_name_for;

/// Rejects names `jj`/git would refuse, before anything is dispatched.
pub fn validate_bookmark_name(name: &str) -> Result<(), GraftError> {
    let invalid = |why: &str| Err(GraftError::Validation(format!("invalid bookmark name: {why}")));
    if name.is_empty() {
        return invalid("name is empty");
    }
    if name.chars().any(char::is_whitespace) {
        return invalid("contains whitespace");
    }
    if name.starts_with('-') {
        return invalid("starts with `-`");
    }
    if name.contains("..") {
        return invalid("contains `..`");
    }
    if let Some(c) = name.chars().find(|c| "~^:?*[\\".contains(*c)) {
        return invalid(&format!("contains `{c}`"));
    }
    if name.ends_with('/') || name.ends_with(".lock") {
        return invalid("ends with `/` or `.lock`");
    }
    Ok(())
}

enum Submission {
    Mutate(Mutation),
    Save(FileConfig),
}

impl App {
    pub(super) fn on_action(&mut self, action: Action) -> Vec<Effect> {
        if action == Action::Quit {
            self.quit = true;
            return Vec::new();
        }
        if self.model.error.is_some() {
            return self.on_error_action(action);
        }
        if matches!(self.repo_status, RepoStatus::NotManaged { .. }) {
            return self.on_onboarding_action(action);
        }
        match &self.mode {
            Mode::Normal => self.on_normal_action(action),
            Mode::RebaseSelect(_) => self.on_rebase_action(action),
            Mode::Form(_) => self.on_form_action(action),
        }
    }

    fn on_error_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::DismissError => {
                self.model.error = None;
                Vec::new()
            }
            Action::RetryError => {
                self.model.error = None;
                self.set_status("Retrying…");
                let mut effects = vec![Effect::LoadSnapshot(RefreshMode::Loud)];
                effects.extend(self.reload_remote_lists());
                effects
            }
            Action::CopyError => self
                .model
                .error
                .clone()
                .map(Effect::CopyToClipboard)
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }

    fn on_onboarding_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::InitRepo if self.ensure_idle() => self.dispatch(Mutation::InitRepo),
            Action::Refresh => vec![Effect::LoadSnapshot(RefreshMode::Loud)],
            _ => Vec::new(),
        }
    }

    fn on_normal_action(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::MoveUp
            | Action::MoveDown
            | Action::Top
            | Action::Bottom
            | Action::Select(_) => self.navigate(action),
            Action::Refresh => {
                let mut effects = vec![Effect::LoadSnapshot(RefreshMode::Loud)];
                effects.extend(self.reload_remote_lists());
                effects
            }
            Action::ShowView(view) => self.show_view(view),
            Action::NextView => self.show_view(self.view.next()),

            Action::Edit => self.simple_mutation("edit", |c| Mutation::Edit { rev: c.rev().to_string() }),
            Action::Squash => {
                self.simple_mutation("squash", |c| Mutation::Squash { rev: c.rev().to_string() })
            }
            Action::Abandon => {
                self.simple_mutation("abandon", |c| Mutation::Abandon { rev: c.rev().to_string() })
            }
            Action::NewChild => match self.model.selected_commit() {
                Some(c) => {
                    let rev = c.rev().to_string();
                    if self.ensure_idle() {
                        self.dispatch(Mutation::NewChild { rev })
                    } else {
                        Vec::new()
                    }
                }
                None => {
                    self.set_status("Select a commit to create a child of");
                    Vec::new()
                }
            },
            Action::GitFetch if self.ensure_idle() => self.dispatch(Mutation::GitFetch),
            Action::StartRebase => self.start_rebase(),
            Action::Describe => self.open_describe(),
            Action::CreateBookmark => self.open_bookmark_form(BookmarkAction::Create, None),
            Action::MoveBookmark => self.open_bookmark_form(BookmarkAction::Move, None),
            Action::DeleteBookmark => self.open_bookmark_form(BookmarkAction::Delete, None),
            Action::CreatePr => self.open_create_pr(),
            Action::UpdatePr => self.update_pr(),
            Action::OpenSettings => {
                self.mode = Mode::Form(Form::Settings(SettingsForm::from_settings(&self.settings)));
                Vec::new()
            }
            Action::Login => self.start_login(),
            Action::TicketTransitions => self.open_transitions(),
            Action::Submit if self.view == View::Tickets => self.open_transitions(),
            Action::BookmarkFromTicket => match self.selected_ticket().cloned() {
                Some(ticket) if self.view == View::Tickets => {
                    self.open_bookmark_form(BookmarkAction::Create, Some(bookmark_name_for(&ticket)))
                }
                _ => {
                    self.set_status("Select a ticket first");
                    Vec::new()
                }
            },
            Action::CopyUrl => match self.view {
                View::PullRequests => self
                    .selected_pull_request()
                    .map(|pr| Effect::CopyToClipboard(pr.url.clone()))
                    .into_iter()
                    .collect(),
                View::Tickets => self
                    .selected_ticket()
                    .map(|t| Effect::CopyTicketUrl(t.clone()))
                    .into_iter()
                    .collect(),
                View::Graph => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn navigate(&mut self, action: Action) -> Vec<Effect> {
        let (len, current) = match self.view {
            View::Graph => (self.model.snapshot.len(), self.model.selected),
            View::PullRequests => (self.model.pull_requests.len(), Some(self.pr_cursor)),
            View::Tickets => (self.model.tickets.len(), Some(self.ticket_cursor)),
        };
        if len == 0 {
            return Vec::new();
        }
        let last = len - 1;
        let target = match action {
            Action::MoveUp => current.map(|i| i.saturating_sub(1)).unwrap_or(0),
            Action::MoveDown => current.map(|i| (i + 1).min(last)).unwrap_or(0),
            Action::Top => 0,
            Action::Bottom => last,
            Action::Select(idx) => idx.min(last),
            _ => return Vec::new(),
        };
        match self.view {
            View::Graph => self.model.select(target).into_iter().collect(),
            View::PullRequests => {
                self.pr_cursor = target;
                Vec::new()
            }
            View::Tickets => {
                self.ticket_cursor = target;
                Vec::new()
            }
        }
    }

    fn ensure_idle(&mut self) -> bool {
        match self.in_flight {
            Some(op) => {
                self.set_status(format!("Wait for {} to finish", op.label()));
                false
            }
            None => true,
        }
    }

    fn dispatch(&mut self, mutation: Mutation) -> Vec<Effect> {
        let kind = mutation.kind();
        self.in_flight = Some(kind);
        self.set_status(format!("Running {}…", kind.label()));
        vec![Effect::Mutate(mutation)]
    }

    /// The selected commit, if it exists and may be rewritten.
    fn mutable_selection(&mut self, verb: &str) -> Option<Commit> {
        let Some(commit) = self.model.selected_commit() else {
            self.set_status(format!("Select a commit to {verb}"));
            return None;
        };
        if commit.immutable {
            let msg = format!("Cannot {verb}: {} is immutable", commit.short_change_id());
            self.set_status(msg);
            return None;
        }
        Some(commit.clone())
    }

    fn simple_mutation(&mut self, verb: &str, build: impl FnOnce(&Commit) -> Mutation) -> Vec<Effect> {
        let Some(commit) = self.mutable_selection(verb) else {
            return Vec::new();
        };
        if !self.ensure_idle() {
            return Vec::new();
        }
        self.dispatch(build(&commit))
    }

    fn start_rebase(&mut self) -> Vec<Effect> {
        let Some(commit) = self.mutable_selection("rebase") else {
            return Vec::new();
        };
        if !self.ensure_idle() {
            return Vec::new();
        }
        self.view = View::Graph;
        self.set_status(format!(
            "Rebase {}: pick a destination and press Enter (Esc cancels)",
            commit.short_change_id()
        ));
        self.mode = Mode::RebaseSelect(RebaseSelect {
            source_id: commit.id.clone(),
            source_change_id: commit.change_id.clone(),
            source_label: commit.short_change_id().to_string(),
            dispatched: false,
        });
        Vec::new()
    }

    fn on_rebase_action(&mut self, action: Action) -> Vec<Effect> {
        let Mode::RebaseSelect(select) = &self.mode else {
            return Vec::new();
        };
        if select.dispatched {
            return Vec::new();
        }
        match action {
            Action::MoveUp | Action::MoveDown | Action::Top | Action::Bottom | Action::Select(_) => {
                self.navigate(action)
            }
            Action::Cancel => {
                self.mode = Mode::Normal;
                self.set_status("Rebase cancelled");
                Vec::new()
            }
            Action::Submit => {
                let select = select.clone();
                let Some(source_idx) = self
                    .model
                    .snapshot
                    .find_change(&select.source_change_id, Some(&select.source_id))
                else {
                    self.mode = Mode::Normal;
                    let gone = GraftError::StaleSelection {
                        change_id: select.source_change_id,
                    };
                    self.set_status(format!("Rebase cancelled: {gone}"));
                    return Vec::new();
                };
                let source = &self.model.snapshot.commits()[source_idx];
                let source_rev = source.rev().to_string();
                let Some(dest) = self.model.selected_commit().cloned() else {
                    self.set_status("Select a destination commit");
                    return Vec::new();
                };
                // Refreshes rewrite commit ids, so compare by position in the
                // current snapshot, which resolves the source by change id.
                if self.model.selected == Some(source_idx) {
                    self.mode = Mode::Normal;
                    self.set_status("Cannot rebase a commit onto itself");
                    return Vec::new();
                }
                if !self.ensure_idle() {
                    return Vec::new();
                }
                if let Mode::RebaseSelect(select) = &mut self.mode {
                    select.dispatched = true;
                }
                self.dispatch(Mutation::Rebase {
                    source: source_rev,
                    destination: dest.rev().to_string(),
                })
            }
            _ => Vec::new(),
        }
    }

    fn open_describe(&mut self) -> Vec<Effect> {
        let Some(commit) = self.mutable_selection("describe") else {
            return Vec::new();
        };
        self.mode = Mode::Form(Form::Describe(DescribeForm {
            rev: commit.rev().to_string(),
            change_id: commit.change_id.clone(),
            message: Input::with_text(commit.summary.clone()),
            submitting: false,
        }));
        Vec::new()
    }

    fn open_bookmark_form(&mut self, action: BookmarkAction, prefill: Option<String>) -> Vec<Effect> {
        let target = self
            .model
            .selected_commit()
            .or_else(|| {
                self.model
                    .snapshot
                    .working_copy()
                    .and_then(|idx| self.model.snapshot.get(idx))
            })
            .cloned();
        let Some(commit) = target else {
            self.set_status("Select a commit first");
            return Vec::new();
        };
        let name = match (action, prefill) {
            (_, Some(name)) => name,
            (BookmarkAction::Delete, None) => match commit.branches.first() {
                Some(b) => b.clone(),
                None => {
                    self.set_status("No bookmark on this commit");
                    return Vec::new();
                }
            },
            (BookmarkAction::Move, None) => match self.availability(&commit) {
                PrAvailability::Update { branch, .. } => branch,
                PrAvailability::Create { bookmark, .. } => bookmark,
                PrAvailability::Unavailable => String::new(),
            },
            (BookmarkAction::Create, None) => String::new(),
        };
        self.mode = Mode::Form(Form::Bookmark(BookmarkForm {
            action,
            rev: commit.rev().to_string(),
            name: Input::with_text(name),
            submitting: false,
        }));
        Vec::new()
    }

    fn open_create_pr(&mut self) -> Vec<Effect> {
        if !self.capabilities.hosting {
            self.set_status("Pull requests need a GitHub token: open settings (,) or sign in (L)");
            return Vec::new();
        }
        let Some(commit) = self.model.selected_commit().cloned() else {
            self.set_status("Select a commit first");
            return Vec::new();
        };
        match self.availability(&commit) {
            PrAvailability::Create { bookmark, direct } => {
                self.mode = Mode::Form(Form::CreatePr(PrForm {
                    bookmark,
                    rev: commit.rev().to_string(),
                    move_bookmark: !direct,
                    title: Input::with_text(commit.summary.clone()),
                    body: Input::default(),
                    base: Input::with_text(self.settings.default_base_branch.clone()),
                    focus: PrField::Title,
                    submitting: false,
                }));
            }
            PrAvailability::Update { branch, .. } => {
                self.set_status(format!("{branch} already has an open pull request; press U to update it"));
            }
            PrAvailability::Unavailable => {
                self.set_status("Create a bookmark on this commit or an ancestor first");
            }
        }
        Vec::new()
    }

    fn update_pr(&mut self) -> Vec<Effect> {
        if !self.capabilities.hosting {
            self.set_status("Pull requests need a GitHub token: open settings (,) or sign in (L)");
            return Vec::new();
        }
        let Some(commit) = self.model.selected_commit().cloned() else {
            self.set_status("Select a commit first");
            return Vec::new();
        };
        match self.availability(&commit) {
            PrAvailability::Update { branch, direct } if self.ensure_idle() => {
                self.dispatch(Mutation::UpdatePr {
                    bookmark: branch,
                    rev: commit.rev().to_string(),
                    move_first: !direct,
                })
            }
            PrAvailability::Update { .. } => Vec::new(),
            _ => {
                self.set_status("No open pull request for this commit");
                Vec::new()
            }
        }
    }

    fn start_login(&mut self) -> Vec<Effect> {
        let Some(client_id) = self.settings.github_client_id.clone() else {
            self.set_status("Sign-in needs `github_client_id` in the config file");
            return Vec::new();
        };
        self.mode = Mode::Form(Form::Login(LoginForm {
            client_id: client_id.clone(),
            stage: LoginStage::RequestingCode,
        }));
        vec![Effect::StartLogin { client_id }]
    }

    fn open_transitions(&mut self) -> Vec<Effect> {
        if self.view != View::Tickets {
            return Vec::new();
        }
        let Some(ticket) = self.selected_ticket().cloned() else {
            self.set_status("Select a ticket first");
            return Vec::new();
        };
        let key = ticket.key.clone();
        self.mode = Mode::Form(Form::TicketTransition(TransitionForm {
            ticket,
            transitions: None,
            cursor: 0,
            submitting: false,
        }));
        vec![Effect::LoadTransitions { key }]
    }

    fn on_form_action(&mut self, action: Action) -> Vec<Effect> {
        let Mode::Form(form) = &mut self.mode else {
            return Vec::new();
        };
        match action {
            Action::Cancel => {
                let title = form.title();
                self.mode = Mode::Normal;
                self.set_status(format!("{title} cancelled"));
            }
            Action::Submit => return self.submit_form(),
            Action::Newline if form.accepts_newline() => {
                if let Some(input) = form.focused_input() {
                    input.insert_char('\n');
                }
            }
            Action::Input(c) => {
                if let Some(input) = form.focused_input() {
                    input.insert_char(c);
                }
            }
            Action::Backspace => {
                if let Some(input) = form.focused_input() {
                    input.backspace();
                }
            }
            Action::Delete => {
                if let Some(input) = form.focused_input() {
                    input.delete();
                }
            }
            Action::Left => {
                if let Some(input) = form.focused_input() {
                    input.move_left();
                }
            }
            Action::Right => {
                if let Some(input) = form.focused_input() {
                    input.move_right();
                }
            }
            Action::NextField | Action::MoveDown => form.next_field(true),
            Action::PrevField | Action::MoveUp => form.next_field(false),
            Action::Select(idx) => {
                if let Form::TicketTransition(f) = form {
                    let n = f.transitions.as_ref().map(Vec::len).unwrap_or(0);
                    if idx < n {
                        f.cursor = idx;
                    }
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn submit_form(&mut self) -> Vec<Effect> {
        let Mode::Form(form) = &self.mode else {
            return Vec::new();
        };
        if form.is_submitting() {
            return Vec::new();
        }
        let submission = match form {
            Form::Describe(f) => Ok(Submission::Mutate(Mutation::Describe {
                rev: f.rev.clone(),
                message: f.message.as_str().trim_end().to_string(),
            })),
            Form::Bookmark(f) => {
                let name = f.name.as_str().trim().to_string();
                validate_bookmark_name(&name).map_err(|e| e.to_string()).map(|()| {
                    Submission::Mutate(match f.action {
                        BookmarkAction::Create => Mutation::BookmarkCreate {
                            name,
                            rev: f.rev.clone(),
                        },
                        BookmarkAction::Move => Mutation::BookmarkMove {
                            name,
                            rev: f.rev.clone(),
                        },
                        BookmarkAction::Delete => Mutation::BookmarkDelete { name },
                    })
                })
            }
            Form::CreatePr(f) => {
                if f.title.is_blank() {
                    Err("A pull request needs a title".to_string())
                } else {
                    let base = match f.base.as_str().trim() {
                        "" => self.settings.default_base_branch.clone(),
                        b => b.to_string(),
                    };
                    Ok(Submission::Mutate(Mutation::CreatePr(CreatePrPlan {
                        bookmark: f.bookmark.clone(),
                        rev: f.rev.clone(),
                        move_bookmark: f.move_bookmark,
                        title: f.title.as_str().trim().to_string(),
                        body: f.body.as_str().to_string(),
                        base,
                    })))
                }
            }
            Form::Settings(f) => f.to_file_config().map(Submission::Save),
            Form::TicketTransition(f) => match &f.transitions {
                Some(list) => match list.get(f.cursor) {
                    Some(t) => Ok(Submission::Mutate(Mutation::TicketTransition {
                        key: f.ticket.key.clone(),
                        transition_id: t.id.clone(),
                        name: t.name.clone(),
                    })),
                    None => Err("No status to move to".to_string()),
                },
                None => return Vec::new(),
            },
            Form::Login(_) => return Vec::new(),
        };

        match submission {
            Err(message) => {
                self.set_status(message);
                Vec::new()
            }
            Ok(Submission::Save(cfg)) => {
                if let Mode::Form(form) = &mut self.mode {
                    form.mark_submitting();
                }
                self.set_status("Saving settings…");
                vec![Effect::SaveConfig(cfg)]
            }
            Ok(Submission::Mutate(mutation)) => {
                if !self.ensure_idle() {
                    return Vec::new();
                }
                if let Mode::Form(form) = &mut self.mode {
                    form.mark_submitting();
                }
                self.dispatch(mutation)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/app/machine_tests.rs"]
mod tests;
