use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use super::gateway::AuthGateway;
use super::navigator::{Navigator, LOGIN_ROUTE};
use super::normalize::normalize_user;
use super::store::{CredentialStore, TOKEN_KEY};
use super::types::{LoginCredentials, Session, SessionSnapshot, SessionState, User};
use crate::error::Result;

/// Session manager
/// Keeps the in-memory session consistent with the persisted token across
/// restore, login and logout
///
/// Construct one per process and hand it out by reference. State changes are
/// published through a watch channel; see [`SessionManager::subscribe`].
pub struct SessionManager {
    /// Auth backend
    gateway: Arc<dyn AuthGateway>,

    /// Persisted token slot (shared, not owned)
    store: Arc<dyn CredentialStore>,

    /// Redirect capability used after logout
    navigator: Arc<dyn Navigator>,

    /// Route passed to the navigator after logout
    login_route: String,

    /// Current session + loading flag
    state: watch::Sender<SessionSnapshot>,

    /// Set once restore has begun; restore never runs twice
    restore_started: AtomicBool,
}

impl SessionManager {
    /// Create a manager in the `Initializing` state
    ///
    /// Nothing is restored until [`restore_session`](Self::restore_session)
    /// runs; [`start`](Self::start) does both.
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initializing());

        Self {
            gateway,
            store,
            navigator,
            login_route: LOGIN_ROUTE.to_string(),
            state,
            restore_started: AtomicBool::new(false),
        }
    }

    /// Override the route visited after logout
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Create a manager and kick off session restore on the tokio runtime
    pub fn start(
        gateway: Arc<dyn AuthGateway>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        Self::new(gateway, store, navigator).spawn_restore()
    }

    /// Move the manager behind an `Arc` and restore the session in the background
    pub fn spawn_restore(self) -> Arc<Self> {
        let manager = Arc::new(self);
        let restorer = manager.clone();
        tokio::spawn(async move {
            restorer.restore_session().await;
        });
        manager
    }

    /// Restore the session from the persisted token
    ///
    /// Only the first call does anything. Never fails: any error clears the
    /// persisted token and leaves the manager unauthenticated. If a login or
    /// logout replaced the stored token while the identity check was in
    /// flight, the restore leaves the session to it and only clears loading.
    pub async fn restore_session(&self) {
        if self.restore_started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Session restore already ran, ignoring");
            return;
        }

        let token = match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::info!("No stored token, starting unauthenticated");
                self.state.send_modify(|s| s.loading = false);
                return;
            }
            Err(e) => {
                tracing::error!("Failed to read stored token: {}", e);
                self.discard_token();
                self.state.send_modify(|s| {
                    s.session = None;
                    s.loading = false;
                });
                return;
            }
        };

        tracing::debug!("Restoring session with stored token {}...", token_prefix(&token));

        let identity = self.identify(&token).await;

        // A login or logout that finished while we waited owns the session now
        if self.token_superseded(&token) {
            tracing::info!("Stored token changed during restore, keeping the newer session");
            self.state.send_modify(|s| s.loading = false);
            return;
        }

        match identity {
            Ok(user) => {
                tracing::info!("Session restored");
                tracing::debug!(role = ?user.role(), "Current user role");
                self.state.send_modify(|s| {
                    s.session = Some(Session::new(user, token));
                    s.loading = false;
                });
            }
            Err(e) => {
                tracing::warn!("Load user failed: {}", e);
                self.discard_token();
                self.state.send_modify(|s| {
                    s.session = None;
                    s.loading = false;
                });
            }
        }
    }

    /// Whether the persisted token no longer matches the one being restored
    fn token_superseded(&self, token: &str) -> bool {
        match self.store.get(TOKEN_KEY) {
            Ok(current) => current.as_deref() != Some(token),
            Err(e) => {
                tracing::warn!("Failed to re-read stored token: {}", e);
                false
            }
        }
    }

    async fn identify(&self, token: &str) -> Result<User> {
        let payload = self.gateway.who_am_i(token).await?;
        normalize_user(payload)
    }

    /// Log in with credentials
    ///
    /// Gateway and store errors are returned unchanged and leave both the
    /// session and the store untouched.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User> {
        tracing::debug!(email = %credentials.email, "Logging in");

        let grant = self.gateway.login(credentials).await?;
        self.store.set(TOKEN_KEY, &grant.token)?;

        let user = grant.user.clone();
        self.state
            .send_modify(|s| s.session = Some(Session::new(grant.user, grant.token)));

        tracing::info!("Login successful");
        Ok(user)
    }

    /// Log out
    ///
    /// Local teardown always happens, whatever the backend says, followed by a
    /// single redirect to the login route.
    pub async fn logout(&self) {
        if let Err(e) = self.gateway.logout().await {
            tracing::error!("Logout API failed: {}", e);
        }

        self.discard_token();
        self.state.send_modify(|s| s.session = None);

        tracing::info!("Logged out, redirecting to {}", self.login_route);
        self.navigator.redirect(&self.login_route);
    }

    fn discard_token(&self) {
        if let Err(e) = self.store.delete(TOKEN_KEY) {
            tracing::error!("Failed to delete stored token: {}", e);
        }
    }

    /// Current session and loading flag
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state.borrow().state()
    }

    /// Signed-in user, if any
    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Token of the in-memory session, if any
    pub fn token(&self) -> Option<String> {
        self.state.borrow().session.as_ref().map(|s| s.token.clone())
    }

    /// True until the initial restore has finished
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Receive every state change as it happens
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Wait until the initial restore has finished
    pub async fn wait_until_ready(&self) -> SessionSnapshot {
        let mut rx = self.state.subscribe();
        let ready = rx.wait_for(|s| !s.loading).await.map(|s| s.clone());
        // The sender lives in `self`, so the channel cannot close while we wait
        ready.unwrap_or_else(|_| self.snapshot())
    }
}

/// First characters of a token, safe to log
fn token_prefix(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    &token[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::navigator::RecordingNavigator;
    use crate::auth::store::MemoryCredentialStore;
    use crate::auth::types::LoginGrant;
    use crate::error::SessionError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Gateway returning canned results and counting calls
    #[derive(Default)]
    struct ScriptedGateway {
        login_result: Mutex<Option<Result<LoginGrant>>>,
        logout_error: Mutex<Option<SessionError>>,
        me_result: Mutex<Option<Result<Value>>>,
        me_gate: Option<Arc<Notify>>,
        me_calls: AtomicUsize,
        logout_calls: AtomicUsize,
        seen_tokens: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn with_me(result: Result<Value>) -> Self {
            Self {
                me_result: Mutex::new(Some(result)),
                ..Default::default()
            }
        }

        fn with_login(result: Result<LoginGrant>) -> Self {
            Self {
                login_result: Mutex::new(Some(result)),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl AuthGateway for ScriptedGateway {
        async fn login(&self, _credentials: &LoginCredentials) -> Result<LoginGrant> {
            self.login_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(SessionError::Transport("no script".to_string())))
        }

        async fn logout(&self) -> Result<()> {
            self.logout_calls.fetch_add(1, Ordering::SeqCst);
            match self.logout_error.lock().unwrap().take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        async fn who_am_i(&self, token: &str) -> Result<Value> {
            self.me_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_tokens.lock().unwrap().push(token.to_string());
            if let Some(gate) = &self.me_gate {
                gate.notified().await;
            }
            self.me_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(SessionError::Transport("no script".to_string())))
        }
    }

    /// Store whose every operation fails
    struct BrokenStore;

    impl CredentialStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(SessionError::Storage("disk unavailable".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(SessionError::Storage("disk unavailable".to_string()))
        }

        fn delete(&self, _key: &str) -> Result<bool> {
            Err(SessionError::Storage("disk unavailable".to_string()))
        }
    }

    fn manager_with(
        gateway: Arc<ScriptedGateway>,
        store: Arc<MemoryCredentialStore>,
        navigator: Arc<RecordingNavigator>,
    ) -> SessionManager {
        SessionManager::new(gateway, store, navigator)
    }

    fn grant(token: &str, user: Value) -> LoginGrant {
        LoginGrant {
            token: token.to_string(),
            user: User::from_value(user).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_starts_initializing() {
        let manager = manager_with(
            Arc::new(ScriptedGateway::default()),
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNavigator::new()),
        );

        assert_eq!(manager.state(), SessionState::Initializing);
        assert!(manager.is_loading());
        assert!(manager.user().is_none());
    }

    #[tokio::test]
    async fn test_restore_without_token_skips_gateway() {
        let gateway = Arc::new(ScriptedGateway::default());
        let manager = manager_with(
            gateway.clone(),
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNavigator::new()),
        );

        manager.restore_session().await;

        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert!(!manager.is_loading());
        assert!(manager.user().is_none());
        assert_eq!(gateway.me_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restore_nested_shape() {
        let gateway = Arc::new(ScriptedGateway::with_me(Ok(
            json!({"user": {"id": 1, "role": "admin"}}),
        )));
        let store = Arc::new(MemoryCredentialStore::with_token("stored"));
        let manager = manager_with(gateway.clone(), store, Arc::new(RecordingNavigator::new()));

        manager.restore_session().await;

        assert_eq!(manager.state(), SessionState::Authenticated);
        assert_eq!(manager.user().unwrap(), json!({"id": 1, "role": "admin"}));
        assert_eq!(manager.token().as_deref(), Some("stored"));
        assert_eq!(*gateway.seen_tokens.lock().unwrap(), vec!["stored"]);
    }

    #[tokio::test]
    async fn test_restore_flat_shape() {
        let gateway = Arc::new(ScriptedGateway::with_me(Ok(json!({"id": 2, "role": "viewer"}))));
        let store = Arc::new(MemoryCredentialStore::with_token("stored"));
        let manager = manager_with(gateway, store, Arc::new(RecordingNavigator::new()));

        manager.restore_session().await;

        assert_eq!(manager.state(), SessionState::Authenticated);
        assert_eq!(manager.user().unwrap(), json!({"id": 2, "role": "viewer"}));
    }

    #[tokio::test]
    async fn test_restore_failure_clears_token() {
        let gateway = Arc::new(ScriptedGateway::with_me(Err(SessionError::InvalidOrExpiredToken(
            "jwt expired".to_string(),
        ))));
        let store = Arc::new(MemoryCredentialStore::with_token("stale"));
        let manager = manager_with(gateway, store.clone(), Arc::new(RecordingNavigator::new()));

        manager.restore_session().await;

        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert!(manager.user().is_none());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_malformed_payload_clears_token() {
        let gateway = Arc::new(ScriptedGateway::with_me(Ok(json!("not a user"))));
        let store = Arc::new(MemoryCredentialStore::with_token("stored"));
        let manager = manager_with(gateway, store.clone(), Arc::new(RecordingNavigator::new()));

        manager.restore_session().await;

        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_with_broken_store_ends_unauthenticated() {
        let gateway = Arc::new(ScriptedGateway::default());
        let manager = SessionManager::new(
            gateway.clone(),
            Arc::new(BrokenStore),
            Arc::new(RecordingNavigator::new()),
        );

        manager.restore_session().await;

        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert_eq!(gateway.me_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restore_runs_once() {
        let gateway = Arc::new(ScriptedGateway::with_me(Ok(json!({"id": 1}))));
        let store = Arc::new(MemoryCredentialStore::with_token("stored"));
        let manager = manager_with(gateway.clone(), store, Arc::new(RecordingNavigator::new()));

        manager.restore_session().await;
        manager.restore_session().await;

        assert_eq!(gateway.me_calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_loading_until_identity_settles() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(ScriptedGateway {
            me_result: Mutex::new(Some(Ok(json!({"id": 5})))),
            me_gate: Some(gate.clone()),
            ..Default::default()
        });
        let store = Arc::new(MemoryCredentialStore::with_token("stored"));
        let manager = SessionManager::start(
            gateway.clone(),
            store,
            Arc::new(RecordingNavigator::new()),
        );

        // Wait for the background restore to reach the network call
        while gateway.me_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(manager.state(), SessionState::Initializing);

        gate.notify_one();
        let snapshot = manager.wait_until_ready().await;

        assert!(!snapshot.loading);
        assert_eq!(snapshot.state(), SessionState::Authenticated);
        assert_eq!(snapshot.user().unwrap(), &json!({"id": 5}));
    }

    /// Start a restore of "old" held at the identity check, then log in as "fresh"
    async fn login_during_restore(
        me_result: Result<Value>,
    ) -> (Arc<SessionManager>, Arc<MemoryCredentialStore>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(ScriptedGateway {
            login_result: Mutex::new(Some(Ok(grant("fresh", json!({"id": 7}))))),
            me_result: Mutex::new(Some(me_result)),
            me_gate: Some(gate.clone()),
            ..Default::default()
        });
        let store = Arc::new(MemoryCredentialStore::with_token("old"));
        let manager = SessionManager::start(
            gateway.clone(),
            store.clone(),
            Arc::new(RecordingNavigator::new()),
        );

        while gateway.me_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        manager
            .login(&LoginCredentials::new("ada@example.com", "secret"))
            .await
            .unwrap();
        assert!(manager.is_loading());
        assert_eq!(manager.state(), SessionState::Initializing);

        (manager, store, gate)
    }

    #[tokio::test]
    async fn test_login_during_restore_keeps_login_when_restore_succeeds() {
        let (manager, store, gate) = login_during_restore(Ok(json!({"id": 5}))).await;

        gate.notify_one();
        let snapshot = manager.wait_until_ready().await;

        assert!(!snapshot.loading);
        assert_eq!(snapshot.state(), SessionState::Authenticated);
        assert_eq!(snapshot.user().unwrap(), &json!({"id": 7}));
        assert_eq!(manager.token().as_deref(), Some("fresh"));
        assert_eq!(store.get(TOKEN_KEY).unwrap(), Some("fresh".to_string()));
    }

    #[tokio::test]
    async fn test_login_during_restore_survives_restore_failure() {
        let (manager, store, gate) = login_during_restore(Err(
            SessionError::InvalidOrExpiredToken("jwt expired".to_string()),
        ))
        .await;

        gate.notify_one();
        let snapshot = manager.wait_until_ready().await;

        assert!(!snapshot.loading);
        assert_eq!(snapshot.state(), SessionState::Authenticated);
        assert_eq!(snapshot.user().unwrap(), &json!({"id": 7}));
        assert_eq!(manager.token().as_deref(), Some("fresh"));
        assert_eq!(store.get(TOKEN_KEY).unwrap(), Some("fresh".to_string()));
    }

    #[tokio::test]
    async fn test_logout_during_restore_stays_signed_out() {
        let gate = Arc::new(Notify::new());
        let gateway = Arc::new(ScriptedGateway {
            me_result: Mutex::new(Some(Ok(json!({"id": 5})))),
            me_gate: Some(gate.clone()),
            ..Default::default()
        });
        let store = Arc::new(MemoryCredentialStore::with_token("old"));
        let manager = SessionManager::start(
            gateway.clone(),
            store.clone(),
            Arc::new(RecordingNavigator::new()),
        );

        while gateway.me_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        manager.logout().await;

        gate.notify_one();
        let snapshot = manager.wait_until_ready().await;

        assert_eq!(snapshot.state(), SessionState::Unauthenticated);
        assert_eq!(manager.token(), None);
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_success() {
        let gateway = Arc::new(ScriptedGateway::with_login(Ok(grant("abc", json!({"id": 3})))));
        let store = Arc::new(MemoryCredentialStore::new());
        let manager = manager_with(gateway, store.clone(), Arc::new(RecordingNavigator::new()));
        manager.restore_session().await;

        let user = manager
            .login(&LoginCredentials::new("ada@example.com", "secret"))
            .await
            .unwrap();

        assert_eq!(user, json!({"id": 3}));
        assert_eq!(store.get(TOKEN_KEY).unwrap(), Some("abc".to_string()));
        assert_eq!(manager.user().unwrap(), json!({"id": 3}));
        assert_eq!(manager.token().as_deref(), Some("abc"));
        assert_eq!(manager.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_login_does_not_touch_loading_flag() {
        let gateway = Arc::new(ScriptedGateway::with_login(Ok(grant("abc", json!({"id": 3})))));
        let manager = manager_with(
            gateway,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNavigator::new()),
        );

        manager
            .login(&LoginCredentials::new("ada@example.com", "secret"))
            .await
            .unwrap();

        assert!(manager.is_loading());
        assert!(manager.user().is_some());
    }

    #[tokio::test]
    async fn test_login_failure_propagates_and_changes_nothing() {
        let gateway = Arc::new(ScriptedGateway::with_login(Err(SessionError::InvalidCredentials(
            "Invalid email or password".to_string(),
        ))));
        let store = Arc::new(MemoryCredentialStore::new());
        let manager = manager_with(gateway, store.clone(), Arc::new(RecordingNavigator::new()));
        manager.restore_session().await;
        let before = manager.snapshot();

        let err = manager
            .login(&LoginCredentials::new("ada@example.com", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SessionError::InvalidCredentials("Invalid email or password".to_string())
        );
        assert_eq!(manager.snapshot(), before);
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_store_failure_leaves_session_unchanged() {
        let gateway = Arc::new(ScriptedGateway::with_login(Ok(grant("abc", json!({"id": 3})))));
        let manager = SessionManager::new(
            gateway,
            Arc::new(BrokenStore),
            Arc::new(RecordingNavigator::new()),
        );

        let err = manager
            .login(&LoginCredentials::new("ada@example.com", "secret"))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Storage(_)));
        assert!(manager.user().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_everything_and_redirects_once() {
        let gateway = Arc::new(ScriptedGateway::with_login(Ok(grant("abc", json!({"id": 3})))));
        let store = Arc::new(MemoryCredentialStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let manager = manager_with(gateway.clone(), store.clone(), navigator.clone());
        manager.restore_session().await;
        manager
            .login(&LoginCredentials::new("ada@example.com", "secret"))
            .await
            .unwrap();

        manager.logout().await;

        assert_eq!(gateway.logout_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert!(manager.user().is_none());
        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert_eq!(navigator.visited(), vec![LOGIN_ROUTE]);
    }

    #[tokio::test]
    async fn test_logout_survives_gateway_failure() {
        let gateway = Arc::new(ScriptedGateway {
            logout_error: Mutex::new(Some(SessionError::Transport(
                "connection refused".to_string(),
            ))),
            me_result: Mutex::new(Some(Ok(json!({"id": 7})))),
            ..Default::default()
        });
        let store = Arc::new(MemoryCredentialStore::with_token("live"));
        let navigator = Arc::new(RecordingNavigator::new());
        let manager = manager_with(gateway, store.clone(), navigator.clone());
        manager.restore_session().await;
        assert_eq!(manager.state(), SessionState::Authenticated);

        manager.logout().await;

        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert!(manager.user().is_none());
        assert_eq!(manager.state(), SessionState::Unauthenticated);
        assert_eq!(navigator.visited(), vec![LOGIN_ROUTE]);
    }

    #[tokio::test]
    async fn test_logout_uses_custom_route() {
        let navigator = Arc::new(RecordingNavigator::new());
        let manager = SessionManager::new(
            Arc::new(ScriptedGateway::default()),
            Arc::new(MemoryCredentialStore::new()),
            navigator.clone(),
        )
        .with_login_route("/signin");
        manager.restore_session().await;

        manager.logout().await;

        assert_eq!(navigator.visited(), vec!["/signin"]);
    }

    #[tokio::test]
    async fn test_subscribers_see_every_transition() {
        let gateway = Arc::new(ScriptedGateway::with_login(Ok(grant("abc", json!({"id": 3})))));
        let manager = manager_with(
            gateway,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNavigator::new()),
        );
        let mut rx = manager.subscribe();
        assert!(rx.borrow_and_update().loading);

        manager.restore_session().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().state(), SessionState::Unauthenticated);

        manager
            .login(&LoginCredentials::new("ada@example.com", "secret"))
            .await
            .unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().state(), SessionState::Authenticated);

        manager.logout().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().state(), SessionState::Unauthenticated);
    }

    #[test]
    fn test_token_prefix() {
        assert_eq!(token_prefix("abcdefghijkl"), "abcdefgh");
        assert_eq!(token_prefix("abc"), "abc");
        assert_eq!(token_prefix(""), "");
    }
}
