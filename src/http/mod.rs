//! HTTP surface: router, shared state and the server loop.

pub mod query;
pub mod routes;

pub use query::{PageDefaults, PageQuery};

use crate::db::Controller;
use crate::error::{DbError, DbResult};
use crate::pagination::Paginator;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// Connections still open this long after a shutdown signal are dropped.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
    pub paginator: Paginator,
    pub defaults: PageDefaults,
}

impl AppState {
    pub fn new(controller: Arc<Controller>, paginator: Paginator, defaults: PageDefaults) -> Self {
        Self {
            controller,
            paginator,
            defaults,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    routes::router().with_state(state)
}

/// Serve `app` on `bind_addr` until SIGINT or SIGTERM.
///
/// After the first signal in-flight requests get [`GRACEFUL_TIMEOUT`] to
/// finish; a second signal exits immediately.
pub async fn serve(app: Router, bind_addr: &str) -> DbResult<()> {
    let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
        DbError::connection(
            format!("Failed to bind to {}: {}", bind_addr, e),
            "Check that the port is available",
        )
    })?;
    info!(addr = %bind_addr, "HTTP server listening");

    let shutdown_notify = Arc::new(tokio::sync::Notify::new());
    let notify = shutdown_notify.clone();
    let shutdown_signal = async move {
        wait_for_signal().await;
        notify.notify_one();
    };

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

    tokio::select! {
        result = server => {
            match result {
                Ok(()) => info!("HTTP server stopped"),
                Err(e) => {
                    error!(error = %e, "HTTP server error");
                    return Err(DbError::internal(format!("HTTP server error: {}", e)));
                }
            }
        }
        _ = async {
            shutdown_notify.notified().await;
            info!(
                timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                "Waiting for requests to finish (send signal again to force exit)..."
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

/// Wait for SIGINT or SIGTERM.
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
            Ok(mut stream) => {
                stream.recv().await;
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
