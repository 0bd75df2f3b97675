use reqwest::{Client, Request, Response};
use std::time::Duration;

use crate::error::SessionError;

/// HTTP client for the auth API with retry logic
pub struct ApiHttpClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Maximum number of retries for idempotent requests
    max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    base_delay_ms: u64,
}

impl ApiHttpClient {
    /// Create a new HTTP client
    pub fn new(
        connect_timeout: u64,
        request_timeout: u64,
        max_retries: u32,
    ) -> Result<Self, SessionError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .map_err(|e| SessionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries,
            base_delay_ms: 500,
        })
    }

    /// Override the backoff base delay
    pub fn with_base_delay(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Execute an idempotent request, retrying 429, 5xx and network errors
    /// with exponential backoff
    pub async fn request_with_retry(&self, request: Request) -> Result<Response, SessionError> {
        self.execute(request, self.max_retries).await
    }

    /// Execute a request exactly once (login, logout)
    pub async fn request_no_retry(&self, request: Request) -> Result<Response, SessionError> {
        self.execute(request, 0).await
    }

    async fn execute(&self, request: Request, max_retries: u32) -> Result<Response, SessionError> {
        let mut attempt = 0;

        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(
            method = %method,
            url = %url,
            "Sending HTTP request"
        );

        loop {
            let req = request.try_clone().ok_or_else(|| {
                SessionError::Transport("Request body is not cloneable".to_string())
            })?;

            match self.client.execute(req).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        tracing::debug!(status = %status, "Request successful");
                        return Ok(response);
                    }

                    if (status.as_u16() == 429 || status.is_server_error()) && attempt < max_retries {
                        let delay = self.calculate_backoff_delay(attempt);
                        tracing::warn!(
                            "Received {}, retrying after {}ms (attempt {}/{})",
                            status,
                            delay,
                            attempt + 1,
                            max_retries
                        );

                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        attempt += 1;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    let message = error_message(&body);

                    tracing::warn!(
                        status = status.as_u16(),
                        url = %url,
                        message = %message,
                        attempt = attempt + 1,
                        "HTTP request failed with error response"
                    );
                    return Err(SessionError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }

                Err(e) => {
                    let error_kind = if e.is_timeout() {
                        "timeout"
                    } else if e.is_connect() {
                        "connection_failed"
                    } else if e.is_request() {
                        "request_error"
                    } else if e.is_body() {
                        "body_error"
                    } else {
                        "unknown"
                    };

                    if attempt < max_retries {
                        let delay = self.calculate_backoff_delay(attempt);
                        tracing::warn!(
                            error_kind = error_kind,
                            "Request failed: {}, retrying after {}ms (attempt {}/{})",
                            e,
                            delay,
                            attempt + 1,
                            max_retries
                        );

                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        attempt += 1;
                        continue;
                    }

                    tracing::warn!(
                        error_kind = error_kind,
                        error = %e,
                        url = %url,
                        total_attempts = attempt + 1,
                        "HTTP request failed"
                    );

                    return Err(SessionError::Transport(format!(
                        "{} (kind: {})",
                        e, error_kind
                    )));
                }
            }
        }
    }

    /// Exponential backoff: base_delay * 2^attempt, plus up to 10% jitter
    fn calculate_backoff_delay(&self, attempt: u32) -> u64 {
        let delay = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt));
        let jitter = (delay as f64 * 0.1 * rand::random::<f64>()) as u64;
        delay.saturating_add(jitter)
    }

    /// Get the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Pull a human-readable message out of an error body
///
/// Backends answer `{"message": "..."}` or `{"error": "..."}`; anything else
/// is returned as-is.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
        if let Some(msg) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
        {
            return msg.to_string();
        }
    }
    body.trim().to_string()
}
