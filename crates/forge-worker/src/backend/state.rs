use forge_core::SessionState;
use crate::worker::JobSubmitter;

pub struct GenState {
    pub jobs: JobSubmitter,
    pub model: String,
    /// Snapshot taken at startup; the session never changes state afterwards.
    pub session: SessionState,
}

impl GenState {
    pub fn new(jobs: JobSubmitter, model: String, session: SessionState) -> Self {
        Self {
            jobs,
            model,
            session,
        }
    }
}
