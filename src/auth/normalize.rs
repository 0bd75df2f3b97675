// Identity payload normalization

use serde_json::Value;

use super::types::{json_kind, User};
use crate::error::{Result, SessionError};

/// Extract the user record from an identity payload
///
/// Accepts `{"user": {...}}` and a flat user object. A nested `user` object
/// wins over top-level fields; a null or non-object `user` member falls back
/// to the payload itself.
pub fn normalize_user(payload: Value) -> Result<User> {
    let fields = match payload {
        Value::Object(fields) => fields,
        other => {
            return Err(SessionError::MalformedResponse(format!(
                "identity payload is {}, expected object",
                json_kind(&other)
            )))
        }
    };

    if let Some(Value::Object(nested)) = fields.get("user") {
        return Ok(User::from_map(nested.clone()));
    }

    Ok(User::from_map(fields))
}
