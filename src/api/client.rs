use async_trait::async_trait;

use crate::api::envelope::{ContainerLogs, CreatedContainer, ResultEnvelope};

/// Lifecycle and log operations against the container-management backend.
///
/// Implementations never fail past this boundary: transport, protocol and
/// decoding problems all come back as a failed [`ResultEnvelope`].
#[async_trait]
pub trait ContainerApi: Send + Sync {
    /// Create and start a container named `name` from the configured image.
    ///
    /// The backend reuses (and starts, if needed) an existing container with
    /// the same name.
    async fn create_and_run(
        &self,
        name: &str,
        session_token: &str,
    ) -> ResultEnvelope<CreatedContainer>;

    async fn stop(&self, container_id: &str) -> ResultEnvelope<()>;

    async fn remove(&self, container_id: &str, force: bool) -> ResultEnvelope<()>;

    /// Last `tail_lines` lines of combined stdout/stderr.
    async fn fetch_logs(&self, container_id: &str, tail_lines: u32)
    -> ResultEnvelope<ContainerLogs>;
}
