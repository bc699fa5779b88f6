use std::sync::Arc;
use axum::Router;
use axum::routing::{get, post};
use crate::backend::routes::health::health;
use crate::backend::routes::job::run_job;
use crate::backend::state::GenState;

mod health;
mod job;

pub fn api_routes() -> Router<Arc<GenState>> {
    Router::new()
        .route("/run", post(run_job))
        .route("/health", get(health))
}
