//! Background refresh of the terminal pane while a container runs.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};

use crate::api::ContainerApi;
use crate::controller::presenter::{Presenter, TerminalUpdate};
use crate::controller::session::{
    ContainerSession, ContainerStatus, ScheduledTask, container_id_prefix,
};

pub(crate) struct LogPoller {
    pub(crate) api: Arc<dyn ContainerApi>,
    pub(crate) presenter: Arc<dyn Presenter>,
    /// Weak so that dropping the controller ends the poller.
    pub(crate) session: Weak<Mutex<ContainerSession>>,
    pub(crate) container_id: String,
    pub(crate) interval: Duration,
    pub(crate) tail: u32,
}

impl LogPoller {
    /// Spawn the recurring fetch. With `immediate` the first fetch happens
    /// right away, otherwise after one interval.
    pub(crate) fn spawn(self, immediate: bool) -> ScheduledTask {
        let first = if immediate {
            Instant::now()
        } else {
            Instant::now() + self.interval
        };

        ScheduledTask::new(tokio::spawn(async move {
            let short_id = container_id_prefix(&self.container_id);
            tracing::debug!(container_id = %short_id, "Log poller started");

            let mut ticker = tokio::time::interval_at(first, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !self.refresh().await {
                    tracing::debug!(container_id = %short_id, "Session gone, log poller exiting");
                    break;
                }
            }
        }))
    }

    /// One fetch-and-render. Returns `false` once the session no longer exists.
    async fn refresh(&self) -> bool {
        let envelope = self.api.fetch_logs(&self.container_id, self.tail).await;

        let Some(session) = self.session.upgrade() else {
            return false;
        };
        let session = session.lock().await;

        // A tail for a container we have since left behind is stale.
        if session.status != ContainerStatus::Running
            || session.container_id.as_deref() != Some(self.container_id.as_str())
        {
            return true;
        }

        match envelope.into_result() {
            Ok(tail) => self.presenter.terminal(TerminalUpdate::from_tail(tail.logs)),
            Err(message) => {
                tracing::warn!(
                    container_id = %container_id_prefix(&self.container_id),
                    error = %message,
                    "Log refresh failed"
                );
            }
        }
        true
    }
}
