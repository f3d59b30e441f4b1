//! Application state and initialization
//!
//! This module manages the central application state and server lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::ServerConfig;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::routes;
use crate::services::{AuthService, TodoService};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub auth: AuthService,
    pub todos: TodoService,
}

impl AppState {
    pub fn new(config: ServerConfig, pool: SqlitePool) -> Self {
        let repo = Repository::new(pool);
        let auth = AuthService::new(
            repo.clone(),
            config.token_secret.clone(),
            config.token_ttl_hours,
        );
        let todos = TodoService::new(repo);

        Self {
            config: Arc::new(config),
            auth,
            todos,
        }
    }
}

/// Application setup - called once on startup
pub async fn setup(config: ServerConfig) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("Data directory: {:?}", config.data_dir);

    std::fs::create_dir_all(&config.data_dir)?;

    let pool = create_pool(&config.database_path()).await?;
    let state = AppState::new(config, pool);

    tracing::info!("Application initialized successfully");

    Ok(state)
}

/// Bind the listener and serve until Ctrl+C or SIGTERM
pub async fn run(state: AppState) -> Result<()> {
    let address = state.config.bind_address();
    let app = routes::router(state);

    tracing::info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
