use tracing::{info, warn};

use super::{Services, no_ticket_provider};
use crate::app::{CreatePrPlan, Mutation, MutationOutcome};
use crate::error::GraftError;
use crate::hosting::{NewPullRequest, PullRequestHost, RetryPolicy, with_retries};
use crate::model::PullRequest;
use crate::vcs::Vcs;

/// Moves the bookmark if the commit only inherits it, pushes, then opens the
/// pull request. A failed step stops the chain.
pub async fn create_pull_request(
    vcs: &dyn Vcs,
    host: &dyn PullRequestHost,
    retry: RetryPolicy,
    plan: &CreatePrPlan,
) -> Result<PullRequest, GraftError> {
    if plan.move_bookmark {
        info!(bookmark = %plan.bookmark, rev = %plan.rev, "moving bookmark before opening pull request");
        vcs.bookmark_move(&plan.bookmark, &plan.rev).await?;
    }
    host.push(&plan.bookmark).await?;

    let req = NewPullRequest {
        title: plan.title.clone(),
        body: plan.body.clone(),
        head: plan.bookmark.clone(),
        base: plan.base.clone(),
    };
    let req = &req;
    with_retries("create pull request", retry, move || host.create(req)).await
}

/// Brings an open pull request's branch up to the commit and pushes it.
pub async fn update_pull_request(
    vcs: &dyn Vcs,
    host: &dyn PullRequestHost,
    bookmark: &str,
    rev: &str,
    move_first: bool,
) -> Result<(), GraftError> {
    if move_first {
        vcs.bookmark_move(bookmark, rev).await?;
    }
    host.push(bookmark).await
}

fn require_host(services: &Services) -> Result<&dyn PullRequestHost, GraftError> {
    services.host.as_deref().ok_or_else(|| {
        GraftError::Validation("no GitHub token configured".to_string())
    })
}

fn short(rev: &str) -> &str {
    match rev.char_indices().nth(8) {
        Some((idx, _)) => &rev[..idx],
        None => rev,
    }
}

/// Runs one mutation and takes a fresh snapshot for the result message.
pub async fn run_mutation(
    services: &Services,
    mutation: Mutation,
) -> Result<MutationOutcome, GraftError> {
    let vcs = services.vcs.as_ref();
    let message = match mutation {
        Mutation::Describe { rev, message } => {
            vcs.describe(&rev, &message).await?;
            format!("Updated description of {}", short(&rev))
        }
        Mutation::NewChild { rev } => {
            vcs.new_child(&rev).await?;
            format!("Started a new change on {}", short(&rev))
        }
        Mutation::Edit { rev } => {
            vcs.edit(&rev).await?;
            format!("Now editing {}", short(&rev))
        }
        Mutation::Squash { rev } => {
            vcs.squash(&rev).await?;
            format!("Squashed {} into its parent", short(&rev))
        }
        Mutation::Abandon { rev } => {
            vcs.abandon(&rev).await?;
            format!("Abandoned {}", short(&rev))
        }
        Mutation::Rebase {
            source,
            destination,
        } => {
            vcs.rebase(&source, &destination).await?;
            format!("Rebased {} onto {}", short(&source), short(&destination))
        }
        Mutation::BookmarkCreate { name, rev } => {
            vcs.bookmark_create(&name, &rev).await?;
            format!("Created bookmark {name}")
        }
        Mutation::BookmarkMove { name, rev } => {
            vcs.bookmark_move(&name, &rev).await?;
            format!("Moved {name} to {}", short(&rev))
        }
        Mutation::BookmarkDelete { name } => {
            vcs.bookmark_delete(&name).await?;
            format!("Deleted bookmark {name}")
        }
        Mutation::CreatePr(plan) => {
            let host = require_host(services)?;
            let pr = create_pull_request(vcs, host, services.retry, &plan).await?;
            format!("Opened pull request #{} for {}", pr.number, plan.bookmark)
        }
        Mutation::UpdatePr {
            bookmark,
            rev,
            move_first,
        } => {
            let host = require_host(services)?;
            update_pull_request(vcs, host, &bookmark, &rev, move_first).await?;
            format!("Pushed {bookmark}")
        }
        Mutation::TicketTransition {
            key,
            transition_id,
            name,
        } => {
            let provider = services.tickets.as_deref().ok_or_else(no_ticket_provider)?;
            provider.apply_transition(&key, &transition_id).await?;
            format!("Moved ticket to {name}")
        }
        Mutation::GitFetch => {
            vcs.git_fetch().await?;
            "Fetched from remotes".to_string()
        }
        Mutation::InitRepo => {
            vcs.init().await?;
            "Initialized a jj repository".to_string()
        }
    };

    let snapshot = match vcs.snapshot().await {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!(error = %err, "snapshot after mutation failed");
            None
        }
    };
    Ok(MutationOutcome { message, snapshot })
}
