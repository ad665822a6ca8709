//! Typed client for the container-management backend.

mod client;
mod envelope;
mod http;

pub use client::ContainerApi;
pub use envelope::{ContainerLogs, CreatedContainer, HealthStatus, ResultEnvelope};
pub use http::HttpContainerApi;
