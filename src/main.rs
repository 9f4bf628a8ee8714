use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use insight_nexus::config::{Cli, Config};
use insight_nexus::db;
use insight_nexus::payment::StripeGateway;
use insight_nexus::routes;
use insight_nexus::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment first, so clap sees values from .env
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    // The server keeps running when the store is unavailable; requests fail instead.
    let db_path = config.db_path();
    tracing::info!("Document store: {}", db_path.display());
    let pool = db::create_pool(&db_path);
    if let Err(e) = db::run_migrations(&pool) {
        tracing::error!("Failed to prepare document store: {:#}", e);
    }

    let state = AppState {
        db: pool,
        payments: Arc::new(StripeGateway::new(&config.payments)),
        config: config.clone(),
    };

    let app = routes::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server is running on port: {}", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
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
