//! Configuration resolved from the environment.
//!
//! A `.env` file in the working directory is loaded first (by the binary);
//! real environment variables always win over it.

mod api;
pub(crate) mod helpers;
mod panel;

pub use api::{ApiConfig, BasicAuth, DEFAULT_API_URL, DEFAULT_IMAGE};
pub use panel::PanelConfig;

use crate::error::ConfigError;

/// Serializes env-mutating tests to prevent parallel races.
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Full configuration for the panel.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub panel: PanelConfig,
}

impl Config {
    /// Resolve every section from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api: ApiConfig::resolve()?,
            panel: PanelConfig::resolve()?,
        })
    }
}
