use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use forge_core::JobResult;
use crate::job::JobStatus;

fn empty_input() -> Value {
    Value::Object(Default::default())
}

/// Envelope of one job, `{"id": ..., "input": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "empty_input")]
    pub input: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResponse {
    pub id: String,
    pub status: JobStatus,
    pub output: JobResult,
    pub received_at: DateTime<Utc>,
    pub execution_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub ready: bool,
    pub model: String,
    pub error: Option<String>,
}
