use thiserror::Error;
use forge_core::error::{DecodeError, SessionError, ValidationError};
use forge_export::ExportError;

/// Everything that can end a job early. Collapsed into `JobResult::Failure`
/// by the lifecycle manager.
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("internal error: {0}")]
    Panic(String),
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("model service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Image(#[from] DecodeError),
}
