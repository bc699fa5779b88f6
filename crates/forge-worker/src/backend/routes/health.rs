use std::sync::Arc;
use axum::Json;
use axum::extract::State;
use forge_core::SessionState;
use crate::backend::schemas::HealthResponse;
use crate::backend::state::GenState;

pub async fn health(State(state): State<Arc<GenState>>) -> Json<HealthResponse> {
    let error = match &state.session {
        SessionState::Unavailable(message) => Some(message.clone()),
        _ => None,
    };

    Json(HealthResponse {
        ready: state.session == SessionState::Ready,
        model: state.model.clone(),
        error,
    })
}
