//! reqwest-backed client for the container-management backend.
//!
//! | Operation    | Request                                   |
//! |--------------|-------------------------------------------|
//! | create + run | `POST /containers`                        |
//! | stop         | `POST /containers/{id}/stop`              |
//! | remove       | `DELETE /containers/{id}?force={bool}`    |
//! | logs         | `GET /containers/{id}/logs?tail={n}`      |
//! | health       | `GET /`                                   |
//!
//! Every response body is the backend's JSON envelope
//! `{success, message, data, timestamp}`.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::client::ContainerApi;
use crate::api::envelope::{ContainerLogs, CreatedContainer, HealthStatus, ResultEnvelope};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Upper bound on a response body. A 200-line log tail is far below this.
const MAX_RESPONSE_BYTES: usize = 5 * 1024 * 1024;

/// Body of a create-and-run request.
#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
    session_token: &'a str,
    image: &'a str,
    reuse_existing: bool,
}

/// Envelope as sent by the backend. `timestamp` is accepted and ignored.
#[derive(Debug, Deserialize)]
struct WireEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default, rename = "timestamp")]
    _timestamp: Option<String>,
}

/// FastAPI error body (`HTTPException` detail).
#[derive(Debug, Deserialize)]
struct DetailBody {
    detail: serde_json::Value,
}

/// Client for the container-management backend.
pub struct HttpContainerApi {
    client: Client,
    config: ApiConfig,
}

impl HttpContainerApi {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ApiError::Transport {
            reason: format!("failed to build HTTP client: {}", e),
        })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Check whether the backend is up.
    pub async fn health(&self) -> ResultEnvelope<HealthStatus> {
        match self.call(Method::GET, "", &[], None::<&()>).await {
            Ok((message, data)) => match decode::<HealthStatus>(data) {
                Ok(status) => ResultEnvelope::ok_with_message(status, message),
                Err(e) => ResultEnvelope::failure(e.to_string()),
            },
            Err(e) => ResultEnvelope::failure(e.to_string()),
        }
    }

    fn url(&self, path: &str) -> Result<url::Url, ApiError> {
        Ok(self.config.base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request;
        if let Some(ref auth) = self.config.basic_auth {
            request = request.basic_auth(&auth.username, Some(auth.password.expose_secret()));
        }
        if let Some(ref key) = self.config.api_key {
            request = request.header("X-API-Key", key.expose_secret());
        }
        request
    }

    /// Send one request and unwrap the backend envelope.
    ///
    /// Returns the envelope's message and raw `data` on success.
    async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<(Option<String>, Option<serde_json::Value>), ApiError> {
        let url = self.url(path)?;
        tracing::debug!(method = %method, url = %url, "Sending container API request");

        let mut request = self.client.request(method, url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = read_body(response).await?;

        tracing::debug!(status = %status, url = %url, "Container API response");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        let envelope: WireEnvelope =
            serde_json::from_str(&text).map_err(|e| ApiError::Malformed {
                reason: e.to_string(),
            })?;

        if !envelope.success {
            return Err(ApiError::Rejected {
                message: envelope
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "The backend reported a failure without details".to_string()),
            });
        }

        Ok((envelope.message, envelope.data))
    }

    async fn call_unit(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> ResultEnvelope<()> {
        match self.call(method, path, query, None::<&()>).await {
            Ok((message, _)) => ResultEnvelope::ok_with_message((), message),
            Err(e) => {
                tracing::debug!(path, error = %e, "Container API call failed");
                ResultEnvelope::failure(e.to_string())
            }
        }
    }
}

/// Read the body as text, giving up once it exceeds [`MAX_RESPONSE_BYTES`].
///
/// `Content-Length` is checked up front, but chunked bodies carry none, so
/// the cap is also enforced while streaming.
async fn read_body(response: Response) -> Result<String, ApiError> {
    if let Some(len) = response.content_length()
        && len > MAX_RESPONSE_BYTES as u64
    {
        return Err(ApiError::Malformed {
            reason: format!(
                "response of {} bytes exceeds the {} byte limit",
                len, MAX_RESPONSE_BYTES
            ),
        });
    }

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ApiError::Transport {
            reason: format!("failed to read response body: {}", e),
        })?;
        if body.len() + chunk.len() > MAX_RESPONSE_BYTES {
            return Err(ApiError::Malformed {
                reason: format!("response body exceeds the {} byte limit", MAX_RESPONSE_BYTES),
            });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn container_path(container_id: &str, action: Option<&str>) -> String {
    let id = urlencoding::encode(container_id);
    match action {
        Some(action) => format!("containers/{}/{}", id, action),
        None => format!("containers/{}", id),
    }
}

fn decode<T: DeserializeOwned>(data: Option<serde_json::Value>) -> Result<T, ApiError> {
    let data = data.ok_or_else(|| ApiError::Malformed {
        reason: "response is missing its data payload".to_string(),
    })?;
    serde_json::from_value(data).map_err(|e| ApiError::Malformed {
        reason: e.to_string(),
    })
}

/// Best available description of a non-success response.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<WireEnvelope>(body)
        && let Some(message) = envelope.message.filter(|m| !m.trim().is_empty())
    {
        return message;
    }

    if let Ok(DetailBody { detail }) = serde_json::from_str::<DetailBody>(body) {
        match detail {
            serde_json::Value::String(s) => {
                if !s.trim().is_empty() {
                    return s;
                }
            }
            serde_json::Value::Null => {}
            other => return other.to_string(),
        }
    }

    status
        .canonical_reason()
        .unwrap_or("Unexpected response status")
        .to_string()
}

#[async_trait]
impl ContainerApi for HttpContainerApi {
    async fn create_and_run(
        &self,
        name: &str,
        session_token: &str,
    ) -> ResultEnvelope<CreatedContainer> {
        let body = CreateRequest {
            name,
            session_token,
            image: &self.config.image,
            reuse_existing: true,
        };

        let result = match self.call(Method::POST, "containers", &[], Some(&body)).await {
            Ok((message, data)) => decode::<CreatedContainer>(data).map(|c| (message, c)),
            Err(e) => Err(e),
        };

        match result {
            Ok((message, created)) => {
                tracing::info!(name, container_id = %created.container_id, "Container created");
                ResultEnvelope::ok_with_message(created, message)
            }
            Err(e) => {
                tracing::debug!(name, error = %e, "Create request failed");
                ResultEnvelope::failure(e.to_string())
            }
        }
    }

    async fn stop(&self, container_id: &str) -> ResultEnvelope<()> {
        self.call_unit(Method::POST, &container_path(container_id, Some("stop")), &[])
            .await
    }

    async fn remove(&self, container_id: &str, force: bool) -> ResultEnvelope<()> {
        self.call_unit(
            Method::DELETE,
            &container_path(container_id, None),
            &[("force", force.to_string())],
        )
        .await
    }

    async fn fetch_logs(
        &self,
        container_id: &str,
        tail_lines: u32,
    ) -> ResultEnvelope<ContainerLogs> {
        let path = container_path(container_id, Some("logs"));
        let result = match self
            .call(Method::GET, &path, &[("tail", tail_lines.to_string())], None::<&()>)
            .await
        {
            Ok((_, data)) => decode::<ContainerLogs>(data),
            Err(e) => Err(e),
        };
        ResultEnvelope::from(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_path_encodes_id() {
        assert_eq!(container_path("abc123", Some("stop")), "containers/abc123/stop");
        assert_eq!(container_path("a/b c", None), "containers/a%2Fb%20c");
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        let body = r#"{"success":false,"message":"Container introuvable"}"#;
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, body),
            "Container introuvable"
        );
    }

    #[test]
    fn test_error_message_reads_fastapi_detail() {
        let body = r#"{"detail":"Identifiants invalides"}"#;
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, body),
            "Identifiants invalides"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            "Bad Gateway"
        );
    }

    #[test]
    fn test_decode_missing_data_is_malformed() {
        let err = decode::<ContainerLogs>(None).unwrap_err();
        assert!(matches!(err, ApiError::Malformed { .. }));
    }

    #[test]
    fn test_url_keeps_base_path() {
        let api = HttpContainerApi::new(ApiConfig::with_base_url("http://localhost:8000/api").unwrap())
            .unwrap();
        assert_eq!(
            api.url(&container_path("c1", Some("logs"))).unwrap().as_str(),
            "http://localhost:8000/api/containers/c1/logs"
        );
    }
}
