//! Uniform success/failure wrapper returned by every backend call.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Result of one remote operation.
///
/// A failed envelope always carries a human-readable `message`; the
/// constructors are the only way this crate builds one, so that holds for
/// every envelope handed to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ResultEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Successful envelope that also carries the backend's informational message.
    pub fn ok_with_message(data: T, message: Option<String>) -> Self {
        Self {
            success: true,
            message,
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        };
        Self {
            success: false,
            message: Some(message),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Message to show the visitor for a failed call.
    pub fn failure_message(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown error")
    }

    /// Split into the payload or the failure message.
    pub fn into_result(self) -> Result<T, String> {
        if !self.success {
            return Err(self
                .message
                .unwrap_or_else(|| "Unknown error".to_string()));
        }
        self.data
            .ok_or_else(|| "Response did not include any data".to_string())
    }
}

impl<T> From<Result<T, ApiError>> for ResultEnvelope<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Payload of a successful create-and-run call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedContainer {
    pub container_id: String,
    #[serde(default)]
    pub container_name: Option<String>,
}

/// Payload of a log tail fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerLogs {
    #[serde(default)]
    pub logs: String,
}

/// Payload of the backend liveness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_always_has_message() {
        let env: ResultEnvelope<()> = ResultEnvelope::failure("   ");
        assert!(!env.success);
        assert_eq!(env.failure_message(), "Unknown error");
    }

    #[test]
    fn test_from_api_error() {
        let result: Result<ContainerLogs, ApiError> = Err(ApiError::Transport {
            reason: "connection refused".to_string(),
        });
        let env = ResultEnvelope::from(result);
        assert!(!env.is_success());
        assert!(env.failure_message().contains("connection refused"));
        assert!(env.data.is_none());
    }

    #[test]
    fn test_into_result_requires_data_on_success() {
        let env: ResultEnvelope<CreatedContainer> = ResultEnvelope {
            success: true,
            message: None,
            data: None,
        };
        assert!(env.into_result().is_err());
    }

    #[test]
    fn test_wire_shape_deserializes() {
        let env: ResultEnvelope<CreatedContainer> = serde_json::from_str(
            r#"{"success":true,"message":"ok","data":{"container_id":"c1","container_name":"mini_shell_ab"}}"#,
        )
        .unwrap();
        let created = env.into_result().unwrap();
        assert_eq!(created.container_id, "c1");
        assert_eq!(created.container_name.as_deref(), Some("mini_shell_ab"));
    }

    #[test]
    fn test_failure_without_data_deserializes() {
        let env: ResultEnvelope<HealthStatus> =
            serde_json::from_str(r#"{"success":false,"message":"Container c1 non trouvé"}"#)
                .unwrap();
        assert_eq!(env.data, None);
        assert_eq!(env.into_result(), Err("Container c1 non trouvé".to_string()));
    }
}
