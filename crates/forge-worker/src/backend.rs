mod routes;
mod schemas;
mod state;

use std::sync::Arc;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tracing::info;
use forge_core::SessionState;
use crate::backend::routes::api_routes;
use crate::config::WorkerConfig;
use crate::worker::JobSubmitter;

pub use crate::backend::state::GenState;

pub fn router(state: GenState, max_request_bytes: usize) -> Router {
    Router::new()
        .merge(api_routes())
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .with_state(Arc::new(state))
}

/// Serve job intake until ctrl-c.
pub async fn serve(config: &WorkerConfig, jobs: JobSubmitter, session: SessionState) -> anyhow::Result<()> {
    let app = router(
        GenState::new(jobs, config.model_id.clone(), session),
        config.max_request_bytes,
    );
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));

    let listener = TcpListener::bind(addr).await?;
    info!("Accepting jobs on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;

    Ok(())
}
