//! State owned by a single lifecycle controller.

use std::fmt;

use tokio::task::JoinHandle;

/// Prefix of every container name the panel asks the backend for.
pub const CONTAINER_NAME_PREFIX: &str = "mini_shell_";

/// Number of token characters that go into a container name.
const NAME_TOKEN_CHARS: usize = 8;

/// Number of id characters shown to the visitor.
const DISPLAY_ID_CHARS: usize = 12;

/// Lifecycle state of the panel's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Stopped,
    /// A create, stop or delete request is in flight.
    Loading,
    Running,
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerStatus::Stopped => write!(f, "stopped"),
            ContainerStatus::Loading => write!(f, "loading"),
            ContainerStatus::Running => write!(f, "running"),
        }
    }
}

/// Client-generated token that keeps container names from colliding.
///
/// Uniqueness is all that matters here, not unpredictability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deterministic container name derived from this token.
    pub fn container_name(&self) -> String {
        let short: String = self.0.chars().take(NAME_TOKEN_CHARS).collect();
        format!("{}{}", CONTAINER_NAME_PREFIX, short)
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Short form of a container id for display.
pub fn container_id_prefix(container_id: &str) -> String {
    container_id.chars().take(DISPLAY_ID_CHARS).collect()
}

/// Handle to a background task that is aborted when cancelled or dropped.
///
/// Cancelling is idempotent.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether the task has neither been cancelled nor run to completion.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The one container a controller instance tracks.
#[derive(Debug)]
pub struct ContainerSession {
    pub(crate) container_id: Option<String>,
    pub(crate) status: ContainerStatus,
    pub(crate) token: Option<SessionToken>,
    /// Present only while `status == Running`.
    pub(crate) poll: Option<ScheduledTask>,
    pub(crate) pending_reset: Option<ScheduledTask>,
    pub(crate) closed: bool,
}

impl Default for ContainerSession {
    fn default() -> Self {
        Self {
            container_id: None,
            status: ContainerStatus::Stopped,
            token: None,
            poll: None,
            pending_reset: None,
            closed: false,
        }
    }
}

impl ContainerSession {
    pub(crate) fn stop_polling(&mut self) {
        if let Some(mut poll) = self.poll.take() {
            poll.cancel();
            tracing::debug!("Log poller cancelled");
        }
    }

    pub(crate) fn cancel_pending_reset(&mut self) {
        if let Some(mut reset) = self.pending_reset.take() {
            reset.cancel();
        }
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            container_id: self.container_id.clone(),
            session_token: self.token.as_ref().map(|t| t.as_str().to_string()),
            polling: self.poll.as_ref().is_some_and(ScheduledTask::is_active),
            reset_pending: self
                .pending_reset
                .as_ref()
                .is_some_and(ScheduledTask::is_active),
        }
    }
}

/// Point-in-time copy of a session, for callers and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: ContainerStatus,
    pub container_id: Option<String>,
    pub session_token: Option<String>,
    pub polling: bool,
    pub reset_pending: bool,
}
