use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use std::path::PathBuf;

use crate::auth::{LoginCredentials, LOGIN_ROUTE};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Upper bound on identity-check retries
pub const MAX_HTTP_RETRIES: u32 = 10;

/// Session Keeper - keeps a signed-in session across runs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Base URL of the auth API
    #[arg(short = 'u', long, env = "SESSION_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Path to the SQLite file holding the session token
    #[arg(short = 'd', long, env = "SESSION_DB_FILE", global = true)]
    pub db_file: Option<String>,

    /// Route reported after logout
    #[arg(long, env = "SESSION_LOGIN_ROUTE", default_value = LOGIN_ROUTE, global = true)]
    pub login_route: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "30", global = true)]
    pub http_timeout: u64,

    /// Retries for the identity check
    #[arg(long, env = "HTTP_MAX_RETRIES", default_value = "2", global = true)]
    pub http_retries: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Restore the stored session and show who is signed in
    Status,

    /// Sign in and store the session token
    Login {
        /// Account email (prompted when missing)
        #[arg(short, long)]
        email: Option<String>,

        /// Account password (prompted when missing)
        #[arg(short, long, env = "SESSION_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the stored token
    Logout,

    /// Run the reference auth backend locally
    ServeMock {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Answer /auth/me with a flat user record instead of {"user": ...}
        #[arg(long)]
        flat: bool,

        /// Make every logout fail with a 500
        #[arg(long)]
        fail_logout: bool,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    // Auth API
    pub api_url: String,
    pub login_route: String,

    // Credential store
    pub db_file: PathBuf,

    // HTTP client
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,
    pub http_max_retries: u32,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<(Self, Command)> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        let config = Self::from_args(&args);
        Ok((config, args.command))
    }

    pub fn from_args(args: &CliArgs) -> Self {
        Config {
            api_url: args.api_url.clone(),
            login_route: args.login_route.clone(),

            db_file: args
                .db_file
                .as_deref()
                .map(expand_tilde)
                .unwrap_or_else(default_db_file),

            http_connect_timeout: std::env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            http_request_timeout: args.http_timeout,
            http_max_retries: args.http_retries,

            log_level: args.log_level.clone(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_url)
            .with_context(|| format!("SESSION_API_URL is not a valid URL: {}", self.api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("SESSION_API_URL must use http or https: {}", self.api_url);
        }

        if self.http_request_timeout == 0 {
            anyhow::bail!("HTTP_REQUEST_TIMEOUT must be greater than zero");
        }

        if self.http_max_retries > MAX_HTTP_RETRIES {
            anyhow::bail!(
                "HTTP_MAX_RETRIES must be at most {}, got {}",
                MAX_HTTP_RETRIES,
                self.http_max_retries
            );
        }

        if !self.login_route.starts_with('/') {
            anyhow::bail!(
                "SESSION_LOGIN_ROUTE must be an absolute route: {}",
                self.login_route
            );
        }

        Ok(())
    }
}

/// Default location of the credential database
fn default_db_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("session-keeper").join("session.sqlite3"))
        .unwrap_or_else(|| PathBuf::from("session.sqlite3"))
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

// === Interactive prompts ===

/// Fill in whichever of email/password was not given on the command line
pub fn prompt_login_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<LoginCredentials> {
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email")?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
    };

    if email.trim().is_empty() {
        anyhow::bail!("Email cannot be empty");
    }

    Ok(LoginCredentials::new(email.trim(), password))
}
