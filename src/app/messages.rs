use std::time::Duration;

use crate::error::GraftError;
use crate::hosting::{DeviceCode, LoginPoll};
use crate::model::{ChangedFile, FileConfig, PullRequest, Settings, Snapshot, Ticket, Transition};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Graph,
    PullRequests,
    Tickets,
}

impl View {
    pub const ALL: [View; 3] = [View::Graph, View::PullRequests, View::Tickets];

    pub fn title(self) -> &'static str {
        match self {
            View::Graph => "Graph",
            View::PullRequests => "Pull requests",
            View::Tickets => "Tickets",
        }
    }

    pub fn next(self) -> View {
        match self {
            View::Graph => View::PullRequests,
            View::PullRequests => View::Tickets,
            View::Tickets => View::Graph,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshMode {
    /// Explicit refresh or the follow-up to a user action.
    Loud,
    /// Background refresh from the scheduler.
    Silent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepoStatus {
    Loading,
    Ready,
    NotManaged { path: String },
}

/// Everything a key or a click can ask for. Keyboard and mouse both resolve
/// into this one set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    Top,
    Bottom,
    Select(usize),
    Refresh,
    ShowView(View),
    NextView,

    Edit,
    NewChild,
    Squash,
    Abandon,
    StartRebase,
    Describe,
    CreateBookmark,
    MoveBookmark,
    DeleteBookmark,
    CreatePr,
    UpdatePr,
    GitFetch,
    OpenSettings,
    Login,
    TicketTransitions,
    BookmarkFromTicket,
    CopyUrl,

    Submit,
    Cancel,
    Input(char),
    Backspace,
    Delete,
    Left,
    Right,
    Newline,
    NextField,
    PrevField,

    DismissError,
    RetryError,
    CopyError,
    InitRepo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    Describe,
    NewChild,
    Edit,
    Squash,
    Abandon,
    Rebase,
    BookmarkCreate,
    BookmarkMove,
    BookmarkDelete,
    CreatePr,
    UpdatePr,
    TicketTransition,
    GitFetch,
    InitRepo,
}

impl OpKind {
    pub fn label(self) -> &'static str {
        match self {
            OpKind::Describe => "describe",
            OpKind::NewChild => "new",
            OpKind::Edit => "edit",
            OpKind::Squash => "squash",
            OpKind::Abandon => "abandon",
            OpKind::Rebase => "rebase",
            OpKind::BookmarkCreate => "create bookmark",
            OpKind::BookmarkMove => "move bookmark",
            OpKind::BookmarkDelete => "delete bookmark",
            OpKind::CreatePr => "create pull request",
            OpKind::UpdatePr => "update pull request",
            OpKind::TicketTransition => "ticket transition",
            OpKind::GitFetch => "fetch",
            OpKind::InitRepo => "init",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatePrPlan {
    pub bookmark: String,
    pub rev: String,
    /// The commit only inherits the bookmark; move it here before pushing.
    pub move_bookmark: bool,
    pub title: String,
    pub body: String,
    pub base: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    Describe { rev: String, message: String },
    NewChild { rev: String },
    Edit { rev: String },
    Squash { rev: String },
    Abandon { rev: String },
    Rebase { source: String, destination: String },
    BookmarkCreate { name: String, rev: String },
    BookmarkMove { name: String, rev: String },
    BookmarkDelete { name: String },
    CreatePr(CreatePrPlan),
    UpdatePr { bookmark: String, rev: String, move_first: bool },
    TicketTransition { key: String, transition_id: String, name: String },
    GitFetch,
    InitRepo,
}

impl Mutation {
    pub fn kind(&self) -> OpKind {
        match self {
            Mutation::Describe { .. } => OpKind::Describe,
            Mutation::NewChild { .. } => OpKind::NewChild,
            Mutation::Edit { .. } => OpKind::Edit,
            Mutation::Squash { .. } => OpKind::Squash,
            Mutation::Abandon { .. } => OpKind::Abandon,
            Mutation::Rebase { .. } => OpKind::Rebase,
            Mutation::BookmarkCreate { .. } => OpKind::BookmarkCreate,
            Mutation::BookmarkMove { .. } => OpKind::BookmarkMove,
            Mutation::BookmarkDelete { .. } => OpKind::BookmarkDelete,
            Mutation::CreatePr(_) => OpKind::CreatePr,
            Mutation::UpdatePr { .. } => OpKind::UpdatePr,
            Mutation::TicketTransition { .. } => OpKind::TicketTransition,
            Mutation::GitFetch => OpKind::GitFetch,
            Mutation::InitRepo => OpKind::InitRepo,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationOutcome {
    pub message: String,
    /// Fresh snapshot taken right after the mutation, when that fetch worked.
    pub snapshot: Option<Snapshot>,
}

/// What the hosting and ticket services built from the current settings can do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub hosting: bool,
    pub tickets: bool,
}

/// Work the engine asks the dispatcher to do. Each one produces exactly one
/// `Msg` when it finishes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    LoadSnapshot(RefreshMode),
    LoadChangedFiles { change_id: String, rev: String },
    LoadPullRequests,
    LoadTickets,
    LoadTransitions { key: String },
    Mutate(Mutation),
    ScheduleTick(Duration),
    SchedulePrTick { generation: u64, after: Duration },
    StartLogin { client_id: String },
    PollLogin { client_id: String, device_code: String, after: Duration },
    SaveConfig(FileConfig),
    Reconfigure(Settings),
    CopyToClipboard(String),
    CopyTicketUrl(Ticket),
}

impl Effect {
    /// Short name for logs; payloads can hold credentials.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::LoadSnapshot(RefreshMode::Loud) => "load-snapshot",
            Effect::LoadSnapshot(RefreshMode::Silent) => "load-snapshot-silent",
            Effect::LoadChangedFiles { .. } => "load-changed-files",
            Effect::LoadPullRequests => "load-pull-requests",
            Effect::LoadTickets => "load-tickets",
            Effect::LoadTransitions { .. } => "load-transitions",
            Effect::Mutate(_) => "mutate",
            Effect::ScheduleTick(_) => "schedule-tick",
            Effect::SchedulePrTick { .. } => "schedule-pr-tick",
            Effect::StartLogin { .. } => "start-login",
            Effect::PollLogin { .. } => "poll-login",
            Effect::SaveConfig(_) => "save-config",
            Effect::Reconfigure(_) => "reconfigure",
            Effect::CopyToClipboard(_) => "copy",
            Effect::CopyTicketUrl(_) => "copy-ticket-url",
        }
    }
}

#[derive(Debug)]
pub enum Msg {
    Action(Action),
    Tick,
    PrTick { generation: u64 },
    SnapshotLoaded { mode: RefreshMode, result: Result<Snapshot, GraftError> },
    ChangedFilesLoaded { change_id: String, result: Result<Vec<ChangedFile>, GraftError> },
    PullRequestsLoaded(Result<Vec<PullRequest>, GraftError>),
    TicketsLoaded(Result<Vec<Ticket>, GraftError>),
    TransitionsLoaded { key: String, result: Result<Vec<Transition>, GraftError> },
    MutationFinished { op: OpKind, result: Result<MutationOutcome, GraftError> },
    LoginStarted(Result<DeviceCode, GraftError>),
    LoginPolled(Result<LoginPoll, GraftError>),
    ConfigSaved(Result<Settings, String>),
    Reconfigured { capabilities: Capabilities, error: Option<String> },
    Copied(Result<String, String>),
    TaskFailed(String),
}
