// TaskDeck - todo backend
// Entry point and server setup

use taskdeck::{app, config::ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TaskDeck server");

    let config = ServerConfig::from_env()?;
    let state = app::setup(config).await?;
    app::run(state).await?;

    Ok(())
}
