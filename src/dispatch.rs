//! Runs engine effects off the event loop.
//!
//! Every effect becomes one task in a `JoinSet<Msg>`; the task's return value
//! is its single terminal message. Timers are tasks too, so the loop only ever
//! waits on two things: terminal input and `next()`.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::app::{Capabilities, Effect, Msg};
use crate::config;
use crate::error::GraftError;
use crate::hosting::{
    GitHubHost, PullRequestHost, RetryPolicy, poll_device_token, request_device_code,
};
use crate::model::Settings;
use crate::tickets::{self, TicketProvider};
use crate::vcs::Vcs;

mod chains;

pub use self::chains::{create_pull_request, run_mutation, update_pull_request};

/// The collaborators effects run against.
#[derive(Clone)]
pub struct Services {
    pub vcs: Arc<dyn Vcs>,
    pub host: Option<Arc<dyn PullRequestHost>>,
    pub tickets: Option<Arc<dyn TicketProvider>>,
    pub retry: RetryPolicy,
    repo_root: PathBuf,
    config_path: Option<PathBuf>,
}

impl Services {
    /// Repository access only; hosting and tickets come from [`Services::configure`].
    pub fn new(vcs: Arc<dyn Vcs>, repo_root: PathBuf, config_path: Option<PathBuf>) -> Self {
        Self {
            vcs,
            host: None,
            tickets: None,
            retry: RetryPolicy::default(),
            repo_root,
            config_path,
        }
    }

    pub fn with_host(mut self, host: Arc<dyn PullRequestHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_tickets(mut self, provider: Arc<dyn TicketProvider>) -> Self {
        self.tickets = Some(provider);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Rebuilds the remote services for `settings`. A provider that cannot be
    /// built is left disabled and reported.
    pub fn configure(&mut self, settings: &Settings) -> Result<(), GraftError> {
        self.host = None;
        if let Some(token) = &settings.github_token {
            let host: Arc<dyn PullRequestHost> =
                Arc::new(GitHubHost::new(token.clone(), self.vcs.clone())?);
            self.host = Some(host);
        }
        self.tickets = None;
        self.tickets = tickets::from_settings(settings)?;
        info!(
            hosting = self.host.is_some(),
            tickets = self.tickets.as_ref().map(|t| t.name()).unwrap_or("none"),
            "services configured"
        );
        Ok(())
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            hosting: self.host.is_some(),
            tickets: self.tickets.is_some(),
        }
    }
}

pub struct Dispatcher {
    services: Services,
    tasks: JoinSet<Msg>,
}

impl Dispatcher {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            tasks: JoinSet::new(),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for the next finished task. `None` when nothing is running.
    pub async fn next(&mut self) -> Option<Msg> {
        let joined = self.tasks.join_next().await?;
        Some(joined.unwrap_or_else(|err| {
            warn!(error = %err, "background task did not finish");
            Msg::TaskFailed(err.to_string())
        }))
    }

    fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        self.tasks.spawn(fut);
    }

    /// Spawns work whose terminal message the engine waits on. If the work
    /// panics, `on_abort` still builds that message so the engine can settle.
    fn spawn_guarded<F, A>(&mut self, fut: F, on_abort: A)
    where
        F: Future<Output = Msg> + Send + 'static,
        A: FnOnce(GraftError) -> Msg + Send + 'static,
    {
        self.tasks.spawn(async move {
            match tokio::spawn(fut).await {
                Ok(msg) => msg,
                Err(err) => {
                    warn!(error = %err, "background task stopped");
                    on_abort(GraftError::Interrupted(err.to_string()))
                }
            }
        });
    }

    pub fn dispatch(&mut self, effect: Effect) {
        debug!(effect = effect.name(), "dispatch");
        let services = self.services.clone();
        match effect {
            Effect::LoadSnapshot(mode) => self.spawn_guarded(
                async move {
                    Msg::SnapshotLoaded {
                        mode,
                        result: services.vcs.snapshot().await,
                    }
                },
                move |err| Msg::SnapshotLoaded {
                    mode,
                    result: Err(err),
                },
            ),
            Effect::LoadChangedFiles { change_id, rev } => self.spawn(async move {
                Msg::ChangedFilesLoaded {
                    change_id,
                    result: services.vcs.changed_files(&rev).await,
                }
            }),
            Effect::LoadPullRequests => self.spawn(async move {
                let result = match &services.host {
                    Some(host) => host.list().await,
                    None => Ok(Vec::new()),
                };
                Msg::PullRequestsLoaded(result)
            }),
            Effect::LoadTickets => self.spawn(async move {
                let result = match &services.tickets {
                    Some(provider) => provider.list_assigned().await,
                    None => Ok(Vec::new()),
                };
                Msg::TicketsLoaded(result)
            }),
            Effect::LoadTransitions { key } => {
                let aborted_key = key.clone();
                self.spawn_guarded(
                    async move {
                        let result = match &services.tickets {
                            Some(provider) => provider.list_transitions(&key).await,
                            None => Err(no_ticket_provider()),
                        };
                        Msg::TransitionsLoaded { key, result }
                    },
                    move |err| Msg::TransitionsLoaded {
                        key: aborted_key,
                        result: Err(err),
                    },
                )
            }
            Effect::Mutate(mutation) => {
                let op = mutation.kind();
                self.spawn_guarded(
                    async move {
                        info!(op = op.label(), "mutation started");
                        let result = run_mutation(&services, mutation).await;
                        match &result {
                            Ok(outcome) => info!(op = op.label(), message = %outcome.message, "mutation finished"),
                            Err(err) => warn!(op = op.label(), error = %err, "mutation failed"),
                        }
                        Msg::MutationFinished { op, result }
                    },
                    move |err| Msg::MutationFinished { op, result: Err(err) },
                )
            }
            Effect::ScheduleTick(after) => self.spawn(async move {
                tokio::time::sleep(after).await;
                Msg::Tick
            }),
            Effect::SchedulePrTick { generation, after } => self.spawn(async move {
                tokio::time::sleep(after).await;
                Msg::PrTick { generation }
            }),
            Effect::StartLogin { client_id } => self.spawn_guarded(
                async move { Msg::LoginStarted(request_device_code(&client_id).await) },
                |err| Msg::LoginStarted(Err(err)),
            ),
            Effect::PollLogin {
                client_id,
                device_code,
                after,
            } => self.spawn_guarded(
                async move {
                    tokio::time::sleep(after).await;
                    Msg::LoginPolled(poll_device_token(&client_id, &device_code).await)
                },
                |err| Msg::LoginPolled(Err(err)),
            ),
            Effect::SaveConfig(patch) => self.spawn(async move {
                let saved = tokio::task::spawn_blocking(move || {
                    save_config(&services, patch).map_err(|e| format!("{e:#}"))
                })
                .await;
                Msg::ConfigSaved(saved.unwrap_or_else(|err| {
                    warn!(error = %err, "config save stopped");
                    Err(GraftError::Interrupted(err.to_string()).to_string())
                }))
            }),
            Effect::Reconfigure(settings) => {
                let error = self.services.configure(&settings).err().map(|e| {
                    warn!(error = %e, "service reconfiguration incomplete");
                    e.to_string()
                });
                let capabilities = self.services.capabilities();
                self.spawn(async move {
                    Msg::Reconfigured {
                        capabilities,
                        error,
                    }
                });
            }
            Effect::CopyToClipboard(text) => {
                self.tasks
                    .spawn_blocking(move || Msg::Copied(copy_to_clipboard(&text)));
            }
            Effect::CopyTicketUrl(ticket) => match &services.tickets {
                Some(provider) => {
                    let url = provider.url(&ticket);
                    self.tasks
                        .spawn_blocking(move || Msg::Copied(copy_to_clipboard(&url)));
                }
                None => self.spawn(async move { Msg::Copied(Err(no_ticket_provider().to_string())) }),
            },
        }
    }
}

fn no_ticket_provider() -> GraftError {
    GraftError::Validation("no ticket provider configured".to_string())
}

fn save_config(services: &Services, patch: crate::model::FileConfig) -> anyhow::Result<Settings> {
    let path = services
        .config_path
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no user config directory on this system"))?;
    config::update_file_config(path, patch)?;
    config::load(&services.repo_root)
}

fn copy_to_clipboard(text: &str) -> Result<String, String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| e.to_string())?;
    let preview: String = text.chars().take(40).collect();
    if preview.len() < text.len() {
        Ok(format!("“{preview}…”"))
    } else {
        Ok(format!("“{preview}”"))
    }
}
