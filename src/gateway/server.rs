use crate::config::Config;
use crate::gateway::router;
use crate::{AppError, Result};
use tokio::net::TcpListener;

/// Binds the gateway and serves until Ctrl-C
pub async fn serve(config: &Config) -> Result<()> {
    let app = router(&config.gateway)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Proxying API requests to {}", config.gateway.backend_url);
    tracing::info!("Server listening on {}", addr);

    let app_url = format!("http://localhost:{}", config.server.port);
    tracing::info!("Application started: {}", app_url);

    if config.server.open_browser {
        match open::that_detached(&app_url) {
            Ok(()) => tracing::info!(
                "Browser opened automatically. Set OPEN_BROWSER=false to disable this behaviour."
            ),
            Err(e) => tracing::warn!(error = %e, "Could not open a browser"),
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
