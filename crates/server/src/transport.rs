//! stdio and streamable-HTTP transports.

use crate::error::{Result, ServerError};
use crate::server::BitriseServer;
use axum::Router;
use axum::routing::get;
use bitrise_mcp_scope::RequestScopeLayer;
use rmcp::ServiceExt as _;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// `/mcp` (streamable HTTP) and `/health`, with every request running inside a request scope.
pub fn router(server: BitriseServer) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", mcp)
        .layer(RequestScopeLayer::new())
}

async fn health() -> &'static str {
    "ok"
}

/// Bind `addr` and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`ServerError::Startup`] if the address cannot be bound, or an IO error if serving
/// fails.
pub async fn serve_http<F>(addr: SocketAddr, server: BitriseServer, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Startup(format!("bind {addr}: {e}")))?;
    serve_listener(listener, server, shutdown).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an IO error if serving fails.
pub async fn serve_listener<F>(listener: TcpListener, server: BitriseServer, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "serving streamable HTTP on /mcp");
    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown)
        .await?;
    tracing::info!("HTTP transport stopped");
    Ok(())
}

/// Serve a single MCP session over stdin/stdout until the client disconnects.
///
/// # Errors
///
/// Returns [`ServerError::Startup`] if the session cannot be initialised or ends abnormally.
pub async fn serve_stdio(server: BitriseServer) -> Result<()> {
    tracing::info!("no address specified, serving stdio");
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| ServerError::Startup(format!("start stdio transport: {e}")))?;
    let reason = running
        .waiting()
        .await
        .map_err(|e| ServerError::Startup(format!("stdio transport: {e}")))?;
    tracing::info!(reason = ?reason, "stdio transport stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
