#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

impl PrState {
    pub fn label(self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
            PrState::Merged => "merged",
        }
    }
}

/// A pull request on the hosting service. Only `head_branch` ties it to commits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub head_branch: String,
    pub base_branch: String,
    pub state: PrState,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    /// Provider-internal key used for API calls.
    pub key: String,
    /// Human-facing key, e.g. `ENG-142`.
    pub display_key: String,
    pub status: String,
    pub summary: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub name: String,
}
