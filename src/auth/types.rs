// Session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// User record as returned by the auth backend
///
/// The shape is owned by the server; the only attribute this crate reads is
/// `role`. Always a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct User(Map<String, Value>);

impl User {
    /// Build a user from a JSON value, if it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub(crate) fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The user's role attribute, when present and a string
    pub fn role(&self) -> Option<&str> {
        self.0.get("role").and_then(Value::as_str)
    }

    /// The user's id attribute, as sent by the server
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    /// Look up an arbitrary attribute
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl TryFrom<Value> for User {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let kind = json_kind(&value);
        User::from_value(value).ok_or_else(|| format!("expected user object, got {}", kind))
    }
}

impl From<User> for Value {
    fn from(user: User) -> Self {
        Value::Object(user.0)
    }
}

impl PartialEq<Value> for User {
    fn eq(&self, other: &Value) -> bool {
        matches!(other, Value::Object(fields) if *fields == self.0)
    }
}

/// Short name of a JSON value's type, for error messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Authenticated session held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
    /// When this process established the session (restore or login)
    pub established_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: User, token: String) -> Self {
        Self {
            user,
            token,
            established_at: Utc::now(),
        }
    }
}

/// Credentials submitted to the login endpoint
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginGrant {
    pub token: String,
    pub user: User,
}

/// Lifecycle state of a session manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial restore has not completed yet
    ///
    /// A login that completes during the restore sets the session before the
    /// loading flag clears, so the snapshot may already carry a session here.
    Initializing,
    Unauthenticated,
    Authenticated,
}

/// Observable view of a session manager: the current session and the loading flag
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub loading: bool,
}

impl SessionSnapshot {
    pub(crate) fn initializing() -> Self {
        Self {
            session: None,
            loading: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn state(&self) -> SessionState {
        match (&self.session, self.loading) {
            (_, true) => SessionState::Initializing,
            (Some(_), false) => SessionState::Authenticated,
            (None, false) => SessionState::Unauthenticated,
        }
    }
}
