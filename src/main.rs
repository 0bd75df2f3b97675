use anyhow::{Context, Result};
use std::sync::Arc;

use session_keeper::auth::{SessionManager, SessionState, SqliteCredentialStore, User};
use session_keeper::config::{self, Command};
use session_keeper::{gateway, http_client, mock_backend};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let (config, command) = config::Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Configuration: {:?}", config);

    match command {
        Command::ServeMock {
            port,
            flat,
            fail_logout,
        } => serve_mock(port, flat, fail_logout).await,
        Command::Status => {
            let manager = build_manager(&config)?;
            let snapshot = manager.wait_until_ready().await;
            match snapshot.user() {
                Some(user) => println!("Signed in as {}", describe_user(user)),
                None => println!("Not signed in"),
            }
            Ok(())
        }
        Command::Login { email, password } => {
            let credentials = config::prompt_login_credentials(email, password)?;
            let manager = build_manager(&config)?;
            manager.wait_until_ready().await;

            if let Some(current) = manager.user() {
                tracing::info!("Replacing current session for {}", describe_user(&current));
            }

            let user = manager
                .login(&credentials)
                .await
                .context("Login failed")?;
            println!("Signed in as {}", describe_user(&user));
            Ok(())
        }
        Command::Logout => {
            let manager = build_manager(&config)?;
            if manager.wait_until_ready().await.state() == SessionState::Unauthenticated {
                tracing::info!("No active session, clearing local state anyway");
            }
            manager.logout().await;
            Ok(())
        }
    }
}

/// Wire store, gateway and navigator into a manager and start restoring
fn build_manager(config: &config::Config) -> Result<Arc<SessionManager>> {
    let store = Arc::new(
        SqliteCredentialStore::open(&config.db_file).context("Failed to open credential store")?,
    );

    let http = http_client::ApiHttpClient::new(
        config.http_connect_timeout,
        config.http_request_timeout,
        config.http_max_retries,
    )?;
    let gateway = Arc::new(gateway::HttpAuthGateway::new(
        &config.api_url,
        http,
        store.clone(),
    )?);

    let navigator = Arc::new(|route: &str| {
        println!("Signed out. Continue at {}", route);
    });

    tracing::debug!("Using credential store at {}", store.path().display());
    Ok(SessionManager::new(gateway, store, navigator)
        .with_login_route(config.login_route.clone())
        .spawn_restore())
}

/// "name (role)", falling back to email or id for the name
fn describe_user(user: &User) -> String {
    let name = user
        .get("name")
        .or_else(|| user.get("email"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| user.id().map(|id| format!("user {}", id)))
        .unwrap_or_else(|| "unknown user".to_string());

    match user.role() {
        Some(role) => format!("{} ({})", name, role),
        None => name,
    }
}

/// Run the reference backend until Ctrl+C or SIGTERM
async fn serve_mock(port: u16, flat: bool, fail_logout: bool) -> Result<()> {
    let mut backend = mock_backend::MockAuthBackend::new(mock_backend::MockBackendConfig {
        port,
        me_shape: if flat {
            mock_backend::MeShape::Flat
        } else {
            mock_backend::MeShape::Nested
        },
        fail_logout,
        ..Default::default()
    });

    backend.start().await?;
    println!("Mock auth backend running at {}", backend.url());
    println!("  accounts: admin@example.com / admin, viewer@example.com / viewer");

    shutdown_signal().await;
    backend.stop();
    tracing::info!("Mock auth backend stopped");
    Ok(())
}

/// Handle graceful shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down...");
        },
    }
}
