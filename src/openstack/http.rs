//! HTTP utilities for OpenStack REST API calls

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::ApiError;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Map a non-success response onto the typed error taxonomy. Conflict and
/// not-found are conditions the managers react to; everything else is a
/// plain failure.
fn status_to_error(status: StatusCode, body: &str) -> ApiError {
    let detail = sanitize_for_log(body);
    match status {
        StatusCode::CONFLICT => ApiError::Conflict(detail),
        StatusCode::NOT_FOUND => ApiError::NotFound(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth {
            status: status.as_u16(),
            detail,
        },
        _ => ApiError::Status {
            status: status.as_u16(),
            detail,
        },
    }
}

/// HTTP client wrapper for OpenStack API calls. Tokens go in the
/// `X-Auth-Token` header as the services expect.
#[derive(Clone)]
pub struct OpenStackHttpClient {
    client: Client,
}

impl OpenStackHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("osenv/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request to an OpenStack API
    pub async fn get(&self, url: &str, token: &str) -> Result<Value, ApiError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("X-Auth-Token", token)
            .send()
            .await?;

        self.decode(response).await
    }

    /// Make a POST request to an OpenStack API
    pub async fn post(&self, url: &str, token: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(url).header("X-Auth-Token", token);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        self.decode(response).await
    }

    /// Make an unauthenticated POST request. Used for token issuance only.
    pub async fn post_anonymous(&self, url: &str, body: &Value) -> Result<Value, ApiError> {
        tracing::debug!("POST {} (anonymous)", url);

        let response = self.client.post(url).json(body).send().await?;

        self.decode(response).await
    }

    async fn decode(&self, response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::debug!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(status_to_error(status, &body));
        }

        // Handle empty response
        if body.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}
