use std::net::SocketAddr;
use std::sync::Arc;

use crate::app::config::ServerConfig;
use crate::error::AppError;
use crate::routes::routes;
use crate::state::AppState;

/// Serves the bridge until Ctrl-C.
pub async fn run(state: Arc<AppState>, config: &ServerConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from((config.host, config.port));

    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Shutdown requested");
        })
        .map_err(|e| AppError::Internal(format!("failed to bind {}: {}", addr, e)))?;

    log::info!("PDV bridge listening on http://{}", bound);
    server.await;
    log::info!("Server stopped");
    Ok(())
}
