use serde::{Deserialize, Serialize};

/// Outcome of one job. Serializes as `{"glb": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobResult {
    Success { glb: String },
    Failure { error: String },
}

impl JobResult {
    pub fn failure(error: impl ToString) -> Self {
        Self::Failure { error: error.to_string() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }
}
