use super::OpKind;
use super::input::Input;
use crate::hosting::DeviceCode;
use crate::model::{FileConfig, Settings, Ticket, TicketProviderKind, Transition};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescribeForm {
    pub rev: String,
    pub change_id: String,
    pub message: Input,
    pub submitting: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookmarkAction {
    Create,
    Move,
    Delete,
}

impl BookmarkAction {
    pub fn title(self) -> &'static str {
        match self {
            BookmarkAction::Create => "Create bookmark",
            BookmarkAction::Move => "Move bookmark here",
            BookmarkAction::Delete => "Delete bookmark",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookmarkForm {
    pub action: BookmarkAction,
    pub rev: String,
    pub name: Input,
    pub submitting: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrField {
    Title,
    Body,
    Base,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrForm {
    pub bookmark: String,
    pub rev: String,
    pub move_bookmark: bool,
    pub title: Input,
    pub body: Input,
    pub base: Input,
    pub focus: PrField,
    pub submitting: bool,
}

impl PrForm {
    fn focused_mut(&mut self) -> &mut Input {
        match self.focus {
            PrField::Title => &mut self.title,
            PrField::Body => &mut self.body,
            PrField::Base => &mut self.base,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingKey {
    AutoRefreshSecs,
    PrRefreshSecs,
    DefaultBaseBranch,
    GithubToken,
    TicketProvider,
    JiraBaseUrl,
    JiraEmail,
    JiraToken,
    LinearApiKey,
    CodecksAccount,
    CodecksToken,
}

impl SettingKey {
    pub const ALL: [SettingKey; 11] = [
        SettingKey::AutoRefreshSecs,
        SettingKey::PrRefreshSecs,
        SettingKey::DefaultBaseBranch,
        SettingKey::GithubToken,
        SettingKey::TicketProvider,
        SettingKey::JiraBaseUrl,
        SettingKey::JiraEmail,
        SettingKey::JiraToken,
        SettingKey::LinearApiKey,
        SettingKey::CodecksAccount,
        SettingKey::CodecksToken,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingKey::AutoRefreshSecs => "Refresh interval (s)",
            SettingKey::PrRefreshSecs => "PR refresh (s, 0 = off)",
            SettingKey::DefaultBaseBranch => "Default base branch",
            SettingKey::GithubToken => "GitHub token",
            SettingKey::TicketProvider => "Ticket provider",
            SettingKey::JiraBaseUrl => "Jira URL",
            SettingKey::JiraEmail => "Jira email",
            SettingKey::JiraToken => "Jira API token",
            SettingKey::LinearApiKey => "Linear API key",
            SettingKey::CodecksAccount => "Codecks account",
            SettingKey::CodecksToken => "Codecks token",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(
            self,
            SettingKey::GithubToken
                | SettingKey::JiraToken
                | SettingKey::LinearApiKey
                | SettingKey::CodecksToken
        )
    }

    fn current(self, s: &Settings) -> String {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        match self {
            SettingKey::AutoRefreshSecs => s.auto_refresh.as_secs().to_string(),
            SettingKey::PrRefreshSecs => s.pr_refresh.map(|d| d.as_secs()).unwrap_or(0).to_string(),
            SettingKey::DefaultBaseBranch => s.default_base_branch.clone(),
            SettingKey::GithubToken => opt(&s.github_token),
            SettingKey::TicketProvider => s.ticket_provider.label().to_string(),
            SettingKey::JiraBaseUrl => opt(&s.jira.base_url),
            SettingKey::JiraEmail => opt(&s.jira.email),
            SettingKey::JiraToken => opt(&s.jira.token),
            SettingKey::LinearApiKey => opt(&s.linear.api_key),
            SettingKey::CodecksAccount => opt(&s.codecks.account),
            SettingKey::CodecksToken => opt(&s.codecks.token),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsForm {
    pub fields: Vec<(SettingKey, Input)>,
    pub focus: usize,
    pub submitting: bool,
}

impl SettingsForm {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            fields: SettingKey::ALL
                .iter()
                .map(|&key| (key, Input::with_text(key.current(settings))))
                .collect(),
            focus: 0,
            submitting: false,
        }
    }

    /// Turns the edited fields into a config layer. Blank fields are left unset.
    pub fn to_file_config(&self) -> Result<FileConfig, String> {
        let mut cfg = FileConfig::default();
        for (key, input) in &self.fields {
            let value = input.as_str().trim();
            if value.is_empty() {
                continue;
            }
            let text = Some(value.to_string());
            let secs = || {
                value
                    .parse::<u64>()
                    .map_err(|_| format!("{} must be a whole number of seconds", key.label()))
            };
            match key {
                SettingKey::AutoRefreshSecs => cfg.auto_refresh_secs = Some(secs()?),
                SettingKey::PrRefreshSecs => cfg.pr_refresh_secs = Some(secs()?),
                SettingKey::DefaultBaseBranch => cfg.default_base_branch = text,
                SettingKey::GithubToken => cfg.github_token = text,
                SettingKey::TicketProvider => {
                    cfg.ticket_provider = Some(TicketProviderKind::parse(value).ok_or_else(
                        || format!("unknown ticket provider `{value}` (none, jira, linear, codecks)"),
                    )?)
                }
                SettingKey::JiraBaseUrl => cfg.jira.get_or_insert_default().base_url = text,
                SettingKey::JiraEmail => cfg.jira.get_or_insert_default().email = text,
                SettingKey::JiraToken => cfg.jira.get_or_insert_default().token = text,
                SettingKey::LinearApiKey => cfg.linear.get_or_insert_default().api_key = text,
                SettingKey::CodecksAccount => cfg.codecks.get_or_insert_default().account = text,
                SettingKey::CodecksToken => cfg.codecks.get_or_insert_default().token = text,
            }
        }
        Ok(cfg)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginStage {
    RequestingCode,
    WaitingForUser(DeviceCode),
    Saving,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginForm {
    pub client_id: String,
    pub stage: LoginStage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionForm {
    pub ticket: Ticket,
    /// `None` while the list is loading.
    pub transitions: Option<Vec<Transition>>,
    pub cursor: usize,
    pub submitting: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Form {
    Describe(DescribeForm),
    CreatePr(PrForm),
    Bookmark(BookmarkForm),
    Settings(SettingsForm),
    Login(LoginForm),
    TicketTransition(TransitionForm),
}

impl Form {
    pub fn title(&self) -> &'static str {
        match self {
            Form::Describe(_) => "Describe",
            Form::CreatePr(_) => "Create pull request",
            Form::Bookmark(f) => f.action.title(),
            Form::Settings(_) => "Settings",
            Form::Login(_) => "Sign in to GitHub",
            Form::TicketTransition(_) => "Change ticket status",
        }
    }

    pub fn is_submitting(&self) -> bool {
        match self {
            Form::Describe(f) => f.submitting,
            Form::CreatePr(f) => f.submitting,
            Form::Bookmark(f) => f.submitting,
            Form::Settings(f) => f.submitting,
            Form::Login(f) => f.stage == LoginStage::Saving,
            Form::TicketTransition(f) => f.submitting,
        }
    }

    pub(super) fn mark_submitting(&mut self) {
        match self {
            Form::Describe(f) => f.submitting = true,
            Form::CreatePr(f) => f.submitting = true,
            Form::Bookmark(f) => f.submitting = true,
            Form::Settings(f) => f.submitting = true,
            Form::Login(f) => f.stage = LoginStage::Saving,
            Form::TicketTransition(f) => f.submitting = true,
        }
    }

    /// The mutation whose terminal message closes this form, if any.
    pub fn pending_op(&self) -> Option<OpKind> {
        if !self.is_submitting() {
            return None;
        }
        match self {
            Form::Describe(_) => Some(OpKind::Describe),
            Form::CreatePr(_) => Some(OpKind::CreatePr),
            Form::Bookmark(f) => Some(match f.action {
                BookmarkAction::Create => OpKind::BookmarkCreate,
                BookmarkAction::Move => OpKind::BookmarkMove,
                BookmarkAction::Delete => OpKind::BookmarkDelete,
            }),
            Form::TicketTransition(_) => Some(OpKind::TicketTransition),
            Form::Settings(_) | Form::Login(_) => None,
        }
    }

    /// Text input with focus, when the form has one and is still editable.
    pub fn focused_input(&mut self) -> Option<&mut Input> {
        if self.is_submitting() {
            return None;
        }
        match self {
            Form::Describe(f) => Some(&mut f.message),
            Form::CreatePr(f) => Some(f.focused_mut()),
            Form::Bookmark(f) => Some(&mut f.name),
            Form::Settings(f) => f.fields.get_mut(f.focus).map(|(_, input)| input),
            _ => None,
        }
    }

    pub fn accepts_newline(&self) -> bool {
        match self {
            Form::Describe(_) => true,
            Form::CreatePr(f) => f.focus == PrField::Body,
            _ => false,
        }
    }

    pub fn next_field(&mut self, forward: bool) {
        match self {
            Form::CreatePr(f) => {
                f.focus = match (f.focus, forward) {
                    (PrField::Title, true) | (PrField::Base, false) => PrField::Body,
                    (PrField::Body, true) | (PrField::Title, false) => PrField::Base,
                    (PrField::Base, true) | (PrField::Body, false) => PrField::Title,
                }
            }
            Form::Settings(f) if !f.fields.is_empty() => {
                let n = f.fields.len();
                f.focus = if forward { (f.focus + 1) % n } else { (f.focus + n - 1) % n };
            }
            Form::TicketTransition(f) => {
                let n = f.transitions.as_ref().map(Vec::len).unwrap_or(0);
                if n > 0 {
                    f.cursor = if forward { (f.cursor + 1) % n } else { (f.cursor + n - 1) % n };
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/app/forms_tests.rs"]
mod tests;
