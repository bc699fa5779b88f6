use std::panic::{self, AssertUnwindSafe};
use image::DynamicImage;
use log::{error, info};
use crate::error::{PipelineError, SessionError};
use crate::pipeline::{GenerativePipeline, PipelineLoader, PipelineOutput};
use crate::stage::PipelineCallSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    /// Load failed; permanent for the life of the process.
    Unavailable(String),
}

/// The process-wide model. Created once at startup and owned by the job
/// worker, so at most one `generate` runs at a time.
pub struct ModelSession {
    state: SessionState,
    pipeline: Option<Box<dyn GenerativePipeline>>,
}

impl ModelSession {
    /// Load the model. Never fails: a load error (or panic) leaves the
    /// session `Unavailable` so the process can still answer jobs.
    pub fn initialize(loader: &dyn PipelineLoader) -> Self {
        let loaded = panic::catch_unwind(AssertUnwindSafe(|| loader.load()))
            .unwrap_or_else(|payload| Err(PipelineError::Load(panic_message(payload.as_ref()))));

        match loaded {
            Ok(pipeline) => {
                info!("Model loaded successfully.");
                Self {
                    state: SessionState::Ready,
                    pipeline: Some(pipeline),
                }
            }
            Err(e) => {
                error!("Error loading model: {}", e);
                Self {
                    state: SessionState::Unavailable(e.to_string()),
                    pipeline: None,
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn pipeline(&self) -> Option<&dyn GenerativePipeline> {
        self.pipeline.as_deref()
    }

    pub fn generate(
        &self,
        image: &DynamicImage,
        seed: i64,
        spec: &PipelineCallSpec,
    ) -> Result<PipelineOutput, SessionError> {
        let pipeline = match (&self.state, &self.pipeline) {
            (SessionState::Ready, Some(pipeline)) => pipeline,
            _ => return Err(SessionError::NotReady),
        };

        let processed = pipeline.preprocess(image)?;
        let output = pipeline.run(&processed, seed, spec)?;
        Ok(output)
    }
}

/// Best-effort text of a caught panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
