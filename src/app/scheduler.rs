use tracing::trace;

use super::{App, Effect, Mode, RefreshMode, RepoStatus, View};

impl App {
    /// Why a silent refresh must not run right now, if anything.
    pub(super) fn refresh_blocker(&self) -> Option<&'static str> {
        if self.model.error.is_some() {
            return Some("error displayed");
        }
        if matches!(self.mode, Mode::Form(_)) {
            return Some("form open");
        }
        if self.repo_status != RepoStatus::Ready {
            return Some("repository not ready");
        }
        if self.in_flight.is_some() {
            return Some("mutation running");
        }
        if self.silent_refresh.is_some() {
            return Some("previous refresh still running");
        }
        None
    }

    pub(super) fn on_tick(&mut self) -> Vec<Effect> {
        if !self.auto_refresh {
            return Vec::new();
        }
        let mut effects = vec![Effect::ScheduleTick(self.settings.auto_refresh)];
        match self.refresh_blocker() {
            Some(reason) => trace!(reason, "auto-refresh tick skipped"),
            None => {
                self.silent_refresh = Some(self.mutation_epoch);
                effects.push(Effect::LoadSnapshot(RefreshMode::Silent));
            }
        }
        effects
    }

    pub(super) fn on_pr_tick(&mut self, generation: u64) -> Vec<Effect> {
        if !self.pr_timer.armed || generation != self.pr_timer.generation {
            trace!(generation, "stale pull-request timer dropped");
            return Vec::new();
        }
        let Some(after) = self.settings.pr_refresh else {
            self.pr_timer.armed = false;
            return Vec::new();
        };
        let mut effects = vec![Effect::SchedulePrTick { generation, after }];
        if self.view == View::PullRequests && self.capabilities.hosting && self.model.error.is_none() {
            effects.push(Effect::LoadPullRequests);
        }
        effects
    }

    /// Starts the pull-request timer afresh. Older timers carry an outdated
    /// generation and die on their next tick.
    pub(super) fn arm_pr_timer(&mut self) -> Vec<Effect> {
        self.pr_timer.generation += 1;
        match self.settings.pr_refresh {
            Some(after) if self.capabilities.hosting => {
                self.pr_timer.armed = true;
                vec![Effect::SchedulePrTick {
                    generation: self.pr_timer.generation,
                    after,
                }]
            }
            _ => {
                self.pr_timer.armed = false;
                Vec::new()
            }
        }
    }

    pub(super) fn disarm_pr_timer(&mut self) {
        self.pr_timer.generation += 1;
        self.pr_timer.armed = false;
    }

    pub(super) fn show_view(&mut self, view: View) -> Vec<Effect> {
        if view == self.view {
            return Vec::new();
        }
        let previous = self.view;
        self.view = view;
        let mut effects = Vec::new();
        if view == View::PullRequests {
            if self.capabilities.hosting {
                effects.push(Effect::LoadPullRequests);
            }
            effects.extend(self.arm_pr_timer());
        } else if previous == View::PullRequests {
            self.disarm_pr_timer();
        }
        if view == View::Tickets && self.capabilities.tickets {
            effects.push(Effect::LoadTickets);
        }
        effects
    }
}

#[cfg(test)]
#[path = "../tests/app/scheduler_tests.rs"]
mod tests;
