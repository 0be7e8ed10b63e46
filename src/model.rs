mod commit;
mod config;
mod remote;
mod snapshot;

pub(crate) use self::commit::short;
pub use self::commit::{ChangedFile, Commit, FileStatus};
pub use self::config::{
    CodecksConfig, FileConfig, JiraConfig, LinearConfig, Settings, TicketProviderKind,
};
pub use self::remote::{PrState, PullRequest, Ticket, Transition};
pub use self::snapshot::Snapshot;
