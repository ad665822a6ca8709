use std::time::Duration;

use secrecy::SecretString;

use crate::config::helpers::{optional_env, parse_optional_env};
use crate::error::ConfigError;

/// Default backend address (the FastAPI container manager listens on :8000).
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Image the backend is asked to run for every Mini Shell session.
pub const DEFAULT_IMAGE: &str = "mishu_minishell:latest";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Pre-configured HTTP basic credentials for the backend.
#[derive(Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

/// Connection settings for the container-management backend.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL every request path is joined onto.
    pub base_url: url::Url,
    /// Basic credentials attached to every request, if configured.
    pub basic_auth: Option<BasicAuth>,
    /// `X-API-Key` header attached to every request, if configured.
    pub api_key: Option<SecretString>,
    /// Image requested on create.
    pub image: String,
    /// Transport timeout per request. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "basic_auth",
                &self.basic_auth.as_ref().map(|auth| auth.username.as_str()),
            )
            .field("api_key", &self.api_key.is_some())
            .field("image", &self.image)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Config for `base_url` with every other setting at its default.
    pub fn new(base_url: url::Url) -> Self {
        Self {
            base_url,
            basic_auth: None,
            api_key: None,
            image: DEFAULT_IMAGE.to_string(),
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }

    pub(crate) fn resolve() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            optional_env("MINISHELL_API_URL")?
                .as_deref()
                .unwrap_or(DEFAULT_API_URL),
        )?;

        let username = optional_env("MINISHELL_API_USERNAME")?;
        let password = optional_env("MINISHELL_API_PASSWORD")?;
        let basic_auth = match (username, password) {
            (Some(username), Some(password)) => Some(BasicAuth {
                username,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingRequired {
                    key: "MINISHELL_API_PASSWORD".to_string(),
                    hint: "MINISHELL_API_PASSWORD is required when MINISHELL_API_USERNAME is set"
                        .to_string(),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingRequired {
                    key: "MINISHELL_API_USERNAME".to_string(),
                    hint: "MINISHELL_API_USERNAME is required when MINISHELL_API_PASSWORD is set"
                        .to_string(),
                });
            }
        };

        let timeout_secs: u64 =
            parse_optional_env("MINISHELL_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        Ok(Self {
            base_url,
            basic_auth,
            api_key: optional_env("MINISHELL_API_KEY")?.map(SecretString::from),
            image: optional_env("MINISHELL_IMAGE")?.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            request_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        })
    }

    /// Build a config pointing at `base_url` with everything else defaulted.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(parse_base_url(base_url)?))
    }

    /// Point at a different backend, e.g. from a command-line flag.
    pub fn set_base_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.base_url = parse_base_url(raw)?;
        Ok(())
    }
}

/// Parse and normalize a base URL so relative joins keep its path prefix.
fn parse_base_url(raw: &str) -> Result<url::Url, ConfigError> {
    let mut url = url::Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        key: "MINISHELL_API_URL".to_string(),
        message: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidValue {
            key: "MINISHELL_API_URL".to_string(),
            message: format!("unsupported scheme '{}', expected http or https", url.scheme()),
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
