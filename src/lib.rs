// Session Keeper - client-side session lifecycle

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod mock_backend;

pub use auth::{
    AuthGateway, CredentialStore, LoginCredentials, Navigator, SessionManager, SessionSnapshot,
    SessionState, User,
};
pub use error::{Result, SessionError};
