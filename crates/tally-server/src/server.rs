//! Server implementation.

use tally_core::ServerConfig;
use tokio::net::TcpListener;

use crate::error::ApiError;
use crate::routes;
use crate::state::AppState;

/// The Tally HTTP server.
pub struct TallyServer {
    config: ServerConfig,
    state: AppState,
}

impl TallyServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Bind and serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<(), ApiError> {
        let addr = self.config.bind_address();
        let app = routes::create_router(self.state.clone());

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to bind {addr}: {e}")))?;
        tracing::info!(
            address = %addr,
            store = %self.state.store().describe(),
            "Tally API listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        tracing::info!("Tally API stopped");
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        self.config.bind_address()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}
