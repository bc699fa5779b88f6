use std::sync::Arc;
use std::time::Instant;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use forge_core::JobResult;
use tracing::{error, info, warn};
use uuid::Uuid;
use crate::backend::schemas::{RunRequest, RunResponse};
use crate::backend::state::GenState;
use crate::job::JobStatus;

type Rejected = (StatusCode, Json<RunResponse>);

/// Queue a job and wait for its result.
///
/// Every reply, including a rejected body, carries the `{"output": {"error"}}`
/// envelope.
pub async fn run_job(
    State(state): State<Arc<GenState>>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> Result<Json<RunResponse>, Rejected> {
    let received_at = Utc::now();
    let started = Instant::now();
    let uuid = Uuid::new_v4();

    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!("Rejected job body ({}): {}", uuid, rejection.body_text());
            return Err(failed(
                rejection.status(),
                uuid.to_string(),
                rejection.body_text(),
                received_at,
                started,
            ));
        }
    };

    let id = req.id.unwrap_or_else(|| uuid.to_string());
    info!("Received job {} ({})", id, uuid);

    let pending = match state.jobs.submit(uuid, req.input) {
        Ok(pending) => pending,
        Err(e) => {
            error!("{}", e);
            return Err(failed(StatusCode::SERVICE_UNAVAILABLE, id, e, received_at, started));
        }
    };
    let Ok(output) = pending.await else {
        let message = "Worker stopped before finishing the job".to_string();
        error!("{}", message);
        return Err(failed(StatusCode::SERVICE_UNAVAILABLE, id, message, received_at, started));
    };

    Ok(Json(RunResponse {
        id,
        status: JobStatus::from(&output),
        output,
        received_at,
        execution_ms: started.elapsed().as_millis() as u64,
    }))
}

fn failed(
    status: StatusCode,
    id: String,
    message: String,
    received_at: DateTime<Utc>,
    started: Instant,
) -> Rejected {
    let output = JobResult::failure(message);
    let response = RunResponse {
        id,
        status: JobStatus::from(&output),
        output,
        received_at,
        execution_ms: started.elapsed().as_millis() as u64,
    };
    (status, Json(response))
}
