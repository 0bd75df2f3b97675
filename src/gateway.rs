// HTTP implementation of the auth gateway

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::auth::{AuthGateway, CredentialStore, LoginCredentials, LoginGrant, TOKEN_KEY};
use crate::error::{Result, SessionError};
use crate::http_client::ApiHttpClient;

const LOGIN_PATH: &str = "/auth/login";
const LOGOUT_PATH: &str = "/auth/logout";
const ME_PATH: &str = "/auth/me";

/// Success responses are wrapped as `{"data": ...}`
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Auth gateway speaking JSON over HTTP
pub struct HttpAuthGateway {
    http: ApiHttpClient,

    /// Base URL without trailing slash, e.g. `http://localhost:5000/api`
    base_url: String,

    /// Read to attach the bearer token to logout
    store: Arc<dyn CredentialStore>,
}

impl HttpAuthGateway {
    pub fn new(
        base_url: &str,
        http: ApiHttpClient,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        let parsed = url::Url::parse(base_url).map_err(|e| {
            SessionError::Config(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SessionError::Config(format!(
                "API base URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn build(builder: RequestBuilder) -> Result<reqwest::Request> {
        builder
            .build()
            .map_err(|e| SessionError::Transport(format!("Failed to build request: {}", e)))
    }
}

/// Read a response body and unwrap its `data` envelope
async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| SessionError::Transport(format!("Failed to read response body: {}", e)))?;

    let envelope: Envelope<T> = serde_json::from_str(&body)?;
    Ok(envelope.data)
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginGrant> {
        let request = Self::build(
            self.http
                .client()
                .post(self.endpoint(LOGIN_PATH))
                .json(credentials),
        )?;

        let response = self
            .http
            .request_no_retry(request)
            .await
            .map_err(|e| match e {
                SessionError::Api {
                    status: 400 | 401 | 403,
                    message,
                } => SessionError::InvalidCredentials(message),
                other => other,
            })?;

        let grant: LoginGrant = read_envelope(response).await?;
        if grant.token.is_empty() {
            return Err(SessionError::MalformedResponse(
                "login response contains an empty token".to_string(),
            ));
        }

        Ok(grant)
    }

    async fn logout(&self) -> Result<()> {
        let token = self.store.get(TOKEN_KEY).unwrap_or_else(|e| {
            tracing::debug!("Sending logout without token: {}", e);
            None
        });

        let request = Self::build(Self::bearer(
            self.http.client().post(self.endpoint(LOGOUT_PATH)),
            token.as_deref(),
        ))?;

        self.http.request_no_retry(request).await?;
        Ok(())
    }

    async fn who_am_i(&self, token: &str) -> Result<Value> {
        let request = Self::build(Self::bearer(
            self.http.client().get(self.endpoint(ME_PATH)),
            Some(token),
        ))?;

        let response = self
            .http
            .request_with_retry(request)
            .await
            .map_err(|e| match e {
                SessionError::Api {
                    status: 401 | 403,
                    message,
                } => SessionError::InvalidOrExpiredToken(message),
                other => other,
            })?;

        read_envelope(response).await
    }
}
