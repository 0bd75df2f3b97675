// Credential persistence
// A single well-known slot holds the session token across process restarts

use dashmap::DashMap;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use crate::error::{Result, SessionError};

/// Key of the session token slot
pub const TOKEN_KEY: &str = "token";

/// Persisted key-value slot store
///
/// Access is synchronous; callers are expected to write one at a time.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Remove a key. Returns whether anything was deleted.
    fn delete(&self, key: &str) -> Result<bool>;
}

/// In-memory store, lost on process exit
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: DashMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a session token
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.insert(TOKEN_KEY.to_string(), token.into());
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// SQLite-backed store using an `auth_kv` table
pub struct SqliteCredentialStore {
    path: PathBuf,
}

impl SqliteCredentialStore {
    /// Open (creating if needed) the database file and its table
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SessionError::Storage(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let store = Self { path };
        let conn = store.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS auth_kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;

        tracing::debug!("Credential store ready at {}", store.path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.path).map_err(|e| {
            SessionError::Storage(format!(
                "Failed to open SQLite database {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let value = conn
            .query_row("SELECT value FROM auth_kv WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO auth_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM auth_kv WHERE key = ?", [key])?;
        Ok(removed > 0)
    }
}
