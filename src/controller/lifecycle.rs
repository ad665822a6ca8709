//! Start/stop/delete sequencing for the Mini Shell container.
//!
//! ```text
//!            start()               ok
//!   Stopped ─────────▶ Loading ─────────▶ Running
//!      ▲                  │ fail             │
//!      └──────────────────┘                  │ stop() / delete()
//!      ▲                                     ▼
//!      │         ok                       Loading ── fail ──▶ previous status
//!      └─────────────────────────────────────┘
//! ```
//!
//! Each action flips the status to `Loading` and renders under one lock
//! scope, then releases the lock for the network call. A second action that
//! arrives while `Loading` sees that status and returns without doing
//! anything. The log poller and the full-log view are not actions and may run
//! alongside one.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::ContainerApi;
use crate::config::PanelConfig;
use crate::controller::guidance::classify_failure;
use crate::controller::poller::LogPoller;
use crate::controller::presenter::{ButtonGates, LogModal, PanelView, Presenter, TerminalUpdate};
use crate::controller::session::{
    ContainerSession, ContainerStatus, ScheduledTask, SessionSnapshot, SessionToken,
    container_id_prefix,
};

const IDLE_INFO: &str = "Use the Start button to launch the Mini Shell in a Docker container.";

/// Drives the single Mini Shell container of one panel.
pub struct LifecycleController {
    api: Arc<dyn ContainerApi>,
    presenter: Arc<dyn Presenter>,
    config: PanelConfig,
    session: Arc<Mutex<ContainerSession>>,
}

impl LifecycleController {
    pub fn new(
        api: Arc<dyn ContainerApi>,
        presenter: Arc<dyn Presenter>,
        config: PanelConfig,
    ) -> Self {
        Self {
            api,
            presenter,
            config,
            session: Arc::new(Mutex::new(ContainerSession::default())),
        }
    }

    pub async fn status(&self) -> ContainerStatus {
        self.session.lock().await.status
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Render the current state again without changing it.
    pub async fn refresh_view(&self) {
        let session = self.session.lock().await;
        let (status_text, info_text) = match session.status {
            ContainerStatus::Stopped if session.container_id.is_some() => {
                ("Container stopped", "Mini Shell container is stopped.".to_string())
            }
            ContainerStatus::Stopped => ("Container stopped", IDLE_INFO.to_string()),
            ContainerStatus::Loading => ("Working...", "Waiting for the container API.".to_string()),
            ContainerStatus::Running => (
                "Container running",
                "Mini Shell container is running.".to_string(),
            ),
        };
        self.render(&session, status_text, info_text);
    }

    /// Create (or reuse) and start the container, then begin polling its logs.
    pub async fn start(&self) -> ContainerStatus {
        let (name, token) = {
            let mut session = self.session.lock().await;
            if session.closed || session.status != ContainerStatus::Stopped {
                tracing::debug!(status = %session.status, "Ignoring start request");
                return session.status;
            }

            session.cancel_pending_reset();
            let token = session
                .token
                .get_or_insert_with(SessionToken::generate)
                .clone();
            session.status = ContainerStatus::Loading;
            self.render(
                &session,
                "Starting container...",
                "Starting the Mini Shell container.".to_string(),
            );
            self.presenter.terminal(TerminalUpdate::Replace(
                "Starting Mini Shell container...".to_string(),
            ));
            (token.container_name(), token)
        };

        tracing::info!(name = %name, "Starting container");
        let envelope = self.api.create_and_run(&name, token.as_str()).await;

        // After teardown the outcome is recorded but nothing is rendered or
        // scheduled.
        let mut session = self.session.lock().await;
        match envelope.into_result() {
            Ok(created) => {
                let short_id = container_id_prefix(&created.container_id);
                tracing::info!(container_id = %short_id, "Container running");

                session.container_id = Some(created.container_id.clone());
                session.status = ContainerStatus::Running;
                if session.closed {
                    return session.status;
                }
                self.render(
                    &session,
                    "Container running",
                    format!(
                        "Mini Shell container started successfully (ID: {})",
                        short_id
                    ),
                );
                self.presenter.terminal(TerminalUpdate::Append(
                    "Container started. Each demo is limited to 10 minutes.".to_string(),
                ));
                self.presenter.terminal(TerminalUpdate::Append(
                    "Initialising your Mini Shell session...".to_string(),
                ));
                self.begin_polling(&mut session, created.container_id, true);
            }
            Err(message) => {
                tracing::warn!(name = %name, error = %message, "Container failed to start");

                session.status = ContainerStatus::Stopped;
                if session.closed {
                    return session.status;
                }
                self.render(
                    &session,
                    "Container failed to start",
                    format!("Start failed: {}", message),
                );
                self.presenter
                    .terminal(TerminalUpdate::Append(format!("Error: {}", message)));
                if let Some(guidance) = classify_failure(&message) {
                    self.presenter
                        .terminal(TerminalUpdate::Append(guidance.hint().to_string()));
                }
            }
        }
        session.status
    }

    /// Stop the running container. The container id is kept so it can still
    /// be deleted or restarted.
    pub async fn stop(&self) -> ContainerStatus {
        let container_id = {
            let mut session = self.session.lock().await;
            let container_id = match (&session.container_id, session.status) {
                (Some(id), ContainerStatus::Running) if !session.closed => id.clone(),
                _ => {
                    tracing::debug!(status = %session.status, "Ignoring stop request");
                    return session.status;
                }
            };

            session.stop_polling();
            session.status = ContainerStatus::Loading;
            self.render(
                &session,
                "Stopping container...",
                "Stopping the Mini Shell container.".to_string(),
            );
            self.presenter
                .terminal(TerminalUpdate::Append("Stopping container...".to_string()));
            container_id
        };

        let short_id = container_id_prefix(&container_id);
        tracing::info!(container_id = %short_id, "Stopping container");
        let envelope = self.api.stop(&container_id).await;

        let mut session = self.session.lock().await;
        if envelope.is_success() {
            tracing::info!(container_id = %short_id, "Container stopped");
            session.status = ContainerStatus::Stopped;
            if session.closed {
                return session.status;
            }
            self.render(
                &session,
                "Container stopped",
                format!("Mini Shell container stopped (ID: {})", short_id),
            );
            self.presenter.terminal(TerminalUpdate::Append(
                "Container stopped successfully".to_string(),
            ));
        } else {
            let message = envelope.failure_message().to_string();
            tracing::warn!(container_id = %short_id, error = %message, "Container failed to stop");

            // Presumed still running.
            session.status = ContainerStatus::Running;
            if session.closed {
                return session.status;
            }
            self.render(
                &session,
                "Failed to stop the container",
                format!("Stop failed: {}", message),
            );
            self.presenter
                .terminal(TerminalUpdate::Append(format!("Error: {}", message)));
            self.begin_polling(&mut session, container_id, false);
        }
        session.status
    }

    /// Force-remove the container and forget it. The panel returns to its
    /// placeholder after the configured delay.
    pub async fn delete(&self) -> ContainerStatus {
        let (container_id, previous) = {
            let mut session = self.session.lock().await;
            let container_id = match (&session.container_id, session.status) {
                (Some(id), ContainerStatus::Stopped | ContainerStatus::Running)
                    if !session.closed =>
                {
                    id.clone()
                }
                _ => {
                    tracing::debug!(status = %session.status, "Ignoring delete request");
                    return session.status;
                }
            };

            let previous = session.status;
            session.stop_polling();
            session.status = ContainerStatus::Loading;
            self.render(
                &session,
                "Removing container...",
                "Removing the Mini Shell container.".to_string(),
            );
            self.presenter
                .terminal(TerminalUpdate::Append("Removing container...".to_string()));
            (container_id, previous)
        };

        let short_id = container_id_prefix(&container_id);
        tracing::info!(container_id = %short_id, "Removing container");
        let envelope = self.api.remove(&container_id, true).await;

        let mut session = self.session.lock().await;
        if envelope.is_success() {
            tracing::info!(container_id = %short_id, "Container removed");
            session.container_id = None;
            session.token = None;
            session.status = ContainerStatus::Stopped;
            if session.closed {
                return session.status;
            }
            self.render(
                &session,
                "Container removed",
                "Mini Shell container removed. Use the Start button to create a new one."
                    .to_string(),
            );
            self.presenter.terminal(TerminalUpdate::Append(
                "Container removed successfully".to_string(),
            ));
            session.cancel_pending_reset();
            session.pending_reset = Some(self.schedule_reset());
        } else {
            let message = envelope.failure_message().to_string();
            tracing::warn!(container_id = %short_id, error = %message, "Container failed to be removed");

            session.status = previous;
            if session.closed {
                return session.status;
            }
            self.render(
                &session,
                "Failed to remove the container",
                format!("Delete failed: {}", message),
            );
            self.presenter
                .terminal(TerminalUpdate::Append(format!("Error: {}", message)));
            if previous == ContainerStatus::Running {
                self.begin_polling(&mut session, container_id, false);
            }
        }
        session.status
    }

    /// Fetch a longer tail for the full-log view.
    ///
    /// Independent of the poller and of the `Loading` guard. Returns `None`
    /// when there is no container to read from.
    pub async fn view_full_logs(&self) -> Option<LogModal> {
        let container_id = self.session.lock().await.container_id.clone()?;

        self.presenter.show_log_modal(LogModal::Loading);
        let envelope = self
            .api
            .fetch_logs(&container_id, self.config.modal_tail)
            .await;

        let modal = match envelope.into_result() {
            Ok(tail) => LogModal::from_tail(tail.logs),
            Err(message) => {
                tracing::warn!(
                    container_id = %container_id_prefix(&container_id),
                    error = %message,
                    "Full log fetch failed"
                );
                LogModal::Failed { message }
            }
        };
        self.presenter.show_log_modal(modal.clone());
        Some(modal)
    }

    /// Cancel the poller and any pending reset. Later actions are ignored,
    /// and an action already waiting on the backend only records its outcome.
    pub async fn teardown(&self) {
        let mut session = self.session.lock().await;
        session.closed = true;
        session.stop_polling();
        session.cancel_pending_reset();
        tracing::debug!("Lifecycle controller torn down");
    }

    fn render(&self, session: &ContainerSession, status_text: &str, info_text: String) {
        let view = PanelView {
            status: session.status,
            container_id_prefix: session.container_id.as_deref().map(container_id_prefix),
            status_text: status_text.to_string(),
            info_text,
            buttons: ButtonGates::for_state(session.status, session.container_id.is_some()),
        };
        self.presenter.render(&view);
    }

    /// Replace any existing poller with a fresh one for `container_id`.
    fn begin_polling(&self, session: &mut ContainerSession, container_id: String, immediate: bool) {
        session.stop_polling();
        if session.closed {
            return;
        }

        let poller = LogPoller {
            api: Arc::clone(&self.api),
            presenter: Arc::clone(&self.presenter),
            session: Arc::downgrade(&self.session),
            container_id,
            interval: self.config.poll_interval,
            tail: self.config.poll_tail,
        };
        session.poll = Some(poller.spawn(immediate));
    }

    fn schedule_reset(&self) -> ScheduledTask {
        let presenter = Arc::clone(&self.presenter);
        let delay = self.config.reset_delay;
        ScheduledTask::new(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            presenter.reset_to_placeholder();
        }))
    }
}
