// Auth backend boundary

use async_trait::async_trait;
use serde_json::Value;

use super::types::{LoginCredentials, LoginGrant};
use crate::error::Result;

/// Network calls the session manager depends on
///
/// Transport details (base URL, headers, retries) belong to implementations.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a token and user record
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginGrant>;

    /// Invalidate the current token server-side
    async fn logout(&self) -> Result<()>;

    /// Identify the holder of `token`
    ///
    /// Returns the raw identity payload: either `{"user": {...}}` or the user
    /// record itself. Callers normalize it with
    /// [`normalize_user`](super::normalize_user).
    async fn who_am_i(&self, token: &str) -> Result<Value>;
}
