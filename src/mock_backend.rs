//! Reference auth backend for local development and integration tests.
//!
//! Serves `POST /auth/login`, `POST /auth/logout` and `GET /auth/me` with the
//! `{"data": ...}` envelope the HTTP gateway expects.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shape of the `/auth/me` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeShape {
    /// `{"data": {"user": {...}}}`
    Nested,
    /// `{"data": {...}}`
    Flat,
}

/// A login the backend accepts
#[derive(Debug, Clone)]
pub struct MockAccount {
    pub email: String,
    pub password: String,
    pub user: Value,
}

impl MockAccount {
    pub fn new(email: &str, password: &str, user: Value) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            user,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MockBackendConfig {
    /// 0 picks an ephemeral port
    pub port: u16,
    pub accounts: Vec<MockAccount>,
    pub me_shape: MeShape,
    /// Answer every logout with a 500
    pub fail_logout: bool,
}

impl Default for MockBackendConfig {
    fn default() -> Self {
        Self {
            port: 0,
            accounts: vec![
                MockAccount::new(
                    "admin@example.com",
                    "admin",
                    json!({"id": 1, "name": "Admin", "role": "admin"}),
                ),
                MockAccount::new(
                    "viewer@example.com",
                    "viewer",
                    json!({"id": 2, "name": "Viewer", "role": "viewer"}),
                ),
            ],
            me_shape: MeShape::Nested,
            fail_logout: false,
        }
    }
}

/// Shared backend state: configuration and live tokens
struct BackendState {
    config: MockBackendConfig,
    sessions: DashMap<String, Value>,
}

/// Mock auth server
pub struct MockAuthBackend {
    state: Arc<BackendState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    port: u16,
}

impl MockAuthBackend {
    pub fn new(config: MockBackendConfig) -> Self {
        Self {
            state: Arc::new(BackendState {
                config,
                sessions: DashMap::new(),
            }),
            shutdown_tx: None,
            port: 0,
        }
    }

    /// Start serving in the background and return the bound port
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("127.0.0.1:{}", self.state.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();
        self.port = port;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.shutdown_tx = Some(shutdown_tx);

        let app = self.router();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        tracing::info!("Mock auth backend listening on {}", self.url());
        Ok(port)
    }

    /// Routes served by this backend
    pub fn router(&self) -> Router {
        Router::new()
            .route("/auth/login", post(handle_login))
            .route("/auth/logout", post(handle_logout))
            .route("/auth/me", get(handle_me))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Mint a live token for an account without going through login
    pub fn issue_token(&self, email: &str) -> Option<String> {
        let account = self
            .state
            .config
            .accounts
            .iter()
            .find(|a| a.email == email)?;
        let token = uuid::Uuid::new_v4().to_string();
        self.state.sessions.insert(token.clone(), account.user.clone());
        Some(token)
    }

    /// Whether the backend still honours `token`
    pub fn is_live(&self, token: &str) -> bool {
        self.state.sessions.contains_key(token)
    }

    pub fn live_sessions(&self) -> usize {
        self.state.sessions.len()
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAuthBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn handle_login(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<LoginBody>,
) -> Response {
    let account = state
        .config
        .accounts
        .iter()
        .find(|a| a.email == body.email && a.password == body.password);

    match account {
        Some(account) => {
            let token = uuid::Uuid::new_v4().to_string();
            state.sessions.insert(token.clone(), account.user.clone());
            tracing::debug!(email = %account.email, "Mock login accepted");
            Json(json!({ "data": { "token": token, "user": account.user } })).into_response()
        }
        None => error_response(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

async fn handle_logout(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if state.config.fail_logout {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Logout unavailable");
    }

    if let Some(token) = bearer_token(&headers) {
        state.sessions.remove(token);
    }
    Json(json!({ "data": null })).into_response()
}

async fn handle_me(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    let user = bearer_token(&headers)
        .and_then(|token| state.sessions.get(token).map(|entry| entry.value().clone()));

    match (user, state.config.me_shape) {
        (Some(user), MeShape::Nested) => Json(json!({ "data": { "user": user } })).into_response(),
        (Some(user), MeShape::Flat) => Json(json!({ "data": user })).into_response(),
        (None, _) => error_response(StatusCode::UNAUTHORIZED, "Invalid or expired token"),
    }
}
