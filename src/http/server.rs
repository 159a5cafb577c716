//! HTTP server with graceful shutdown.

use crate::error::{AdminError, AdminResult};
use crate::http::{AppState, router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// Time allowed for in-flight requests after a shutdown signal.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpServer {
    state: AppState,
    host: String,
    port: u16,
    max_upload_bytes: usize,
}

impl HttpServer {
    pub fn new(
        state: AppState,
        host: impl Into<String>,
        port: u16,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            state,
            host: host.into(),
            port,
            max_upload_bytes,
        }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Serve until SIGINT/SIGTERM, then drain requests for up to [`GRACEFUL_TIMEOUT`].
    pub async fn run(&self) -> AdminResult<()> {
        let bind_addr = self.bind_addr();
        let app = router(self.state.clone(), self.max_upload_bytes);

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            AdminError::internal(format!("Failed to bind to {}: {}", bind_addr, e))
        })?;
        info!(addr = %bind_addr, "HTTP server listening");

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();

        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        // A long upload can keep the server alive; a second signal or the timeout forces exit.
        tokio::select! {
            result = server => {
                match result {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        return Err(AdminError::internal(format!("HTTP server error: {}", e)));
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for in-flight requests (send signal again to force exit)..."
                );

                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => {}
        }

        Ok(())
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::db::{ColumnTypePolicy, ConnectionFactory};

    fn state() -> AppState {
        let server = ServerConfig::parse("postgres://admin@localhost:5432").unwrap();
        AppState::new(
            ConnectionFactory::new(server, Duration::from_secs(1)),
            ColumnTypePolicy::Trusted,
        )
    }

    #[test]
    fn test_bind_addr() {
        let server = HttpServer::new(state(), "0.0.0.0", 3000, 1024);
        assert_eq!(server.bind_addr(), "0.0.0.0:3000");
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let server = HttpServer::new(state(), "127.0.0.1", port, 1024);
        let err = server.run().await.unwrap_err();
        assert!(err.to_string().contains("Failed to bind"));
    }
}
