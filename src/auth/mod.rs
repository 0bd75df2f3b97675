// Session module
// Session lifecycle, credential persistence and the collaborators it is wired to

mod gateway;
mod manager;
mod navigator;
mod normalize;
mod store;
mod types;

pub use gateway::AuthGateway;
pub use manager::SessionManager;
pub use navigator::{Navigator, RecordingNavigator, LOGIN_ROUTE};
pub use normalize::normalize_user;
pub use store::{CredentialStore, MemoryCredentialStore, SqliteCredentialStore, TOKEN_KEY};
pub use types::{LoginCredentials, LoginGrant, Session, SessionSnapshot, SessionState, User};
