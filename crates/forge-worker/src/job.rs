use std::panic::{self, AssertUnwindSafe};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use forge_core::codec;
use forge_core::error::{MODEL_UNAVAILABLE, SessionError};
use forge_core::request::{self, GenerationRequest};
use forge_core::session::panic_message;
use forge_core::{JobResult, ModelSession, SessionState, stage};
use forge_export::AssetExporter;
use crate::error::JobError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Completed,
    Failed,
}

impl From<&JobResult> for JobStatus {
    fn from(result: &JobResult) -> Self {
        if result.is_success() { Self::Completed } else { Self::Failed }
    }
}

/// Drives one job from raw input to `JobResult`.
///
/// Never panics and never returns an error: every failure, including a panic
/// inside a collaborator, becomes `JobResult::Failure`.
pub struct JobLifecycleManager {
    session: ModelSession,
    exporter: AssetExporter,
}

impl JobLifecycleManager {
    pub fn new(session: ModelSession, exporter: AssetExporter) -> Self {
        Self { session, exporter }
    }

    pub fn session_state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn handle(&self, raw: &Value) -> JobResult {
        if !self.session.is_ready() {
            return JobResult::failure(MODEL_UNAVAILABLE);
        }

        let request = match guarded(|| Ok(request::validate(raw)?)) {
            Ok(request) => request,
            Err(e) => {
                warn!("Rejected job input: {}", e);
                return JobResult::failure(e);
            }
        };

        let outcome = guarded(|| self.generate_asset(&request));
        self.release_accelerator_cache();

        match outcome {
            Ok(glb) => JobResult::Success { glb },
            Err(e) => {
                error!(error = ?e, "Job failed: {}", e);
                JobResult::failure(e)
            }
        }
    }

    fn generate_asset(&self, request: &GenerationRequest) -> Result<String, JobError> {
        let spec = stage::build(request);
        info!(
            "Generating {} tier as {} (seed {}, decimation {}, texture {})",
            request.resolution_tier.as_str(),
            spec.variant.id(),
            request.seed,
            request.decimation_target,
            request.texture_size
        );

        let output = self.session.generate(&request.source_image, request.seed, &spec)?;
        let pipeline = self.session.pipeline().ok_or(SessionError::NotReady)?;
        let glb = self
            .exporter
            .export(pipeline, output, request.decimation_target, request.texture_size)?;

        Ok(codec::encode_bytes(&glb))
    }

    fn release_accelerator_cache(&self) {
        let Some(pipeline) = self.session.pipeline() else {
            return;
        };
        let released = panic::catch_unwind(AssertUnwindSafe(|| pipeline.release_cache()));
        match released {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to release accelerator cache: {}", e),
            Err(payload) => warn!("Accelerator cache release panicked: {}", panic_message(payload.as_ref())),
        }
    }
}

fn guarded<T>(f: impl FnOnce() -> Result<T, JobError>) -> Result<T, JobError> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(JobError::Panic(panic_message(payload.as_ref()))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::Ordering;
    use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
    use serde_json::json;
    use crate::test_support::{Behaviour, FakeBackend, FakeLoader, encoded_png};

    fn manager(loader: &FakeLoader, backend: FakeBackend, root: &std::path::Path) -> JobLifecycleManager {
        let session = ModelSession::initialize(loader);
        let exporter = AssetExporter::new(Box::new(backend)).with_workspace_root(root);
        JobLifecycleManager::new(session, exporter)
    }

    fn is_empty(dir: &std::path::Path) -> bool {
        fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_success_512() {
        let root = tempfile::tempdir().unwrap();
        let loader = FakeLoader::new(Behaviour::Succeed);
        let jobs = manager(&loader, FakeBackend::new(false), root.path());

        let result = jobs.handle(&json!({ "image": encoded_png(), "resolution": "512" }));

        let JobResult::Success { glb } = result else {
            panic!("expected success, got {result:?}");
        };
        assert!(!glb.is_empty());
        assert_eq!(&BASE64_STANDARD.decode(&glb).unwrap()[..4], b"glTF");
        assert_eq!(loader.counters.variants.lock().unwrap().as_slice(), ["512"]);
        assert_eq!(loader.counters.released.load(Ordering::SeqCst), 1);
        assert!(is_empty(root.path()));
    }

    #[test]
    fn test_missing_image_never_generates() {
        let root = tempfile::tempdir().unwrap();
        let loader = FakeLoader::new(Behaviour::Succeed);
        let jobs = manager(&loader, FakeBackend::new(false), root.path());

        for input in [json!({}), json!({ "seed": 3 }), json!({ "image": "" })] {
            let result = jobs.handle(&input);
            assert_eq!(result, JobResult::failure("No image provided in input."));
        }
        assert_eq!(loader.counters.runs.load(Ordering::SeqCst), 0);
        assert_eq!(loader.counters.released.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsupported_resolution_never_generates() {
        let root = tempfile::tempdir().unwrap();
        let loader = FakeLoader::new(Behaviour::Succeed);
        let jobs = manager(&loader, FakeBackend::new(false), root.path());

        for resolution in [json!("9999"), json!("2048"), json!(1024)] {
            let result = jobs.handle(&json!({ "image": encoded_png(), "resolution": resolution }));
            assert!(result.error().unwrap().contains("unsupported resolution"), "{result:?}");
        }
        assert_eq!(loader.counters.preprocessed.load(Ordering::SeqCst), 0);
        assert_eq!(loader.counters.runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unavailable_model_fails_fast() {
        let root = tempfile::tempdir().unwrap();
        let loader = FakeLoader::new(Behaviour::FailLoad);
        let jobs = manager(&loader, FakeBackend::new(false), root.path());
        assert!(matches!(jobs.session_state(), SessionState::Unavailable(_)));

        for input in [json!({}), json!({ "image": encoded_png() })] {
            assert_eq!(jobs.handle(&input), JobResult::failure("Model failed to load."));
        }
        assert!(is_empty(root.path()));
    }

    #[test]
    fn test_export_failure_reports_cause_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let loader = FakeLoader::new(Behaviour::Succeed);
        let jobs = manager(&loader, FakeBackend::new(true), root.path());

        let result = jobs.handle(&json!({ "image": encoded_png() }));

        assert_eq!(result, JobResult::failure("asset export failed: texture baking failed"));
        assert!(is_empty(root.path()));
        assert_eq!(loader.counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_generation_error_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let loader = FakeLoader::new(Behaviour::FailRun);
        let jobs = manager(&loader, FakeBackend::new(false), root.path());

        let result = jobs.handle(&json!({ "image": encoded_png() }));

        assert_eq!(result, JobResult::failure("generation failed: sampler diverged"));
        assert_eq!(loader.counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panic_is_contained_and_next_job_runs() {
        let root = tempfile::tempdir().unwrap();
        let loader = FakeLoader::new(Behaviour::PanicOnSeed(66));
        let jobs = manager(&loader, FakeBackend::new(false), root.path());

        let result = jobs.handle(&json!({ "image": encoded_png(), "seed": 66 }));
        assert_eq!(result, JobResult::failure("internal error: kernel launch failed"));

        let result = jobs.handle(&json!({ "image": encoded_png(), "seed": 1 }));
        assert!(result.is_success());
        assert_eq!(loader.counters.released.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cache_release_failure_does_not_fail_job() {
        let root = tempfile::tempdir().unwrap();
        let loader = FakeLoader::new(Behaviour::FailRelease);
        let jobs = manager(&loader, FakeBackend::new(false), root.path());

        assert!(jobs.handle(&json!({ "image": encoded_png() })).is_success());
    }

    #[test]
    fn test_status_from_result() {
        assert_eq!(JobStatus::from(&JobResult::Success { glb: "x".into() }), JobStatus::Completed);
        assert_eq!(JobStatus::from(&JobResult::failure("x")), JobStatus::Failed);
    }
}
