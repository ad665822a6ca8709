//! Error types for the Mini Shell panel.

use thiserror::Error;

/// Configuration errors raised while resolving settings from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors produced while talking to the container-management backend.
///
/// These never leave the API client: every call converts them into a failed
/// [`ResultEnvelope`](crate::api::ResultEnvelope) carrying the display text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, TLS failure, timeout.
    #[error("Could not reach the container API: {reason}")]
    Transport { reason: String },

    /// The backend answered with a non-success HTTP status.
    #[error("Container API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend answered 2xx but the body could not be understood.
    #[error("Malformed response from container API: {reason}")]
    Malformed { reason: String },

    /// The backend answered 2xx with an envelope reporting failure.
    #[error("{message}")]
    Rejected { message: String },

    /// The request URL could not be built from the configured base URL.
    #[error("Invalid container API URL: {reason}")]
    InvalidUrl { reason: String },
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidUrl {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_backend_message_verbatim() {
        let err = ApiError::Rejected {
            message: "Dockerfile introuvable".to_string(),
        };
        assert_eq!(err.to_string(), "Dockerfile introuvable");
    }

    #[test]
    fn test_status_error_mentions_code() {
        let err = ApiError::Status {
            status: 401,
            message: "Identifiants invalides".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("Identifiants invalides"));
    }
}
