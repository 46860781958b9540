//! Router construction and the serve loop.

use crate::config::ServerConfig;
use crate::context::StoreHandle;
use crate::error::Result;
use crate::handlers;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the application router.
pub fn router(store: StoreHandle, cors: bool) -> Router {
    let issues = get(handlers::list_issues)
        .post(handlers::create_issue)
        .put(handlers::update_issue)
        .delete(handlers::delete_issue);

    // Clients address the collection with and without a trailing slash
    let mut router = Router::new()
        .route("/api/issues/{project}", issues.clone())
        .route("/api/issues/{project}/", issues)
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .with_state(store);

    router = router.layer(TraceLayer::new_for_http());
    if cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM.
///
/// The store is not contacted here; the first request that needs it
/// connects.
///
/// # Errors
///
/// Returns `Error::Io` if the address cannot be bound or the server fails.
pub async fn run(config: ServerConfig) -> Result<()> {
    let store = StoreHandle::new(config.backend.clone());
    let app = router(store, config.cors);

    let listener = TcpListener::bind(config.addr).await?;
    info!(
        addr = %listener.local_addr()?,
        backend = config.backend.kind(),
        cors = config.cors,
        "Listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
