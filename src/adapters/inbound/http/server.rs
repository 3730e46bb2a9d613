use super::router::build_router;
use super::state::AppState;
use crate::shared::Result;
use std::net::SocketAddr;
use tokio::net::TcpListener;

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGTERM, waiting for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Serves the API on `addr` until SIGTERM or Ctrl-C.
///
/// Background scans still running at shutdown are abandoned and stay
/// `in_progress`.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "vulntrack listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            wait_for_shutdown_signal().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}
