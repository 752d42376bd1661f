use std::net::SocketAddr;

use chat_relay::{RelayConfig, RelayServer};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Chat Relay v{}", env!("CARGO_PKG_VERSION"));

    let config = RelayConfig::from_env()?;

    info!("Configuration loaded:");
    info!("  Port: {}", config.port);
    info!("  Model: {}", config.model);
    info!("  Provider: {}", config.provider_base_url);

    let server = RelayServer::new(&config);
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal, gracefully shutting down..."),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
    };

    server.start_with_shutdown(addr, shutdown).await?;

    info!("Chat Relay shutdown complete");
    Ok(())
}
