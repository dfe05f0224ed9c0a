//! Server startup and lifecycle

use crate::{routes, AppState, ServerConfig};
use palaver_db::Store;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// How often expired tokens are purged.
const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Run the forum server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone()).await?);
    spawn_token_sweep(state.store.clone());

    let app = routes::create_router(Arc::clone(&state));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("palaver listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Run server with graceful shutdown
pub async fn run_server_with_shutdown(
    config: ServerConfig,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone()).await?);
    spawn_token_sweep(state.store.clone());

    let app = routes::create_router(Arc::clone(&state));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("palaver listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("shutdown complete");

    Ok(())
}

/// Periodically purge expired tokens.
fn spawn_token_sweep(store: Store) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOKEN_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match store.delete_expired_tokens().await {
                Ok(0) => {}
                Ok(swept) => info!(swept, "purged expired tokens"),
                Err(e) => warn!(error = %e, "token sweep failed"),
            }
        }
    });
}
