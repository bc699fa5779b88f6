mod backend;
mod config;
mod error;
mod job;
mod remote;
mod worker;
#[cfg(test)]
mod test_support;

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use forge_core::ModelSession;
use forge_export::AssetExporter;
use crate::config::WorkerConfig;
use crate::job::JobLifecycleManager;
use crate::remote::RemoteModelService;
use crate::worker::JobWorker;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forge_worker=info,forge_core=info,forge_export=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::load()?;

    // The model client blocks, so everything up to the intake server runs
    // outside the async runtime.
    let service = RemoteModelService::new(&config)?;
    let session = ModelSession::initialize(&service);

    let mut exporter = AssetExporter::new(Box::new(service.asset_backend()));
    if let Some(dir) = &config.workspace_dir {
        exporter = exporter.with_workspace_root(dir);
    }

    let manager = JobLifecycleManager::new(session, exporter);
    let session_state = manager.session_state().clone();
    let mut worker = JobWorker::spawn(manager);

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(backend::serve(&config, worker.submitter(), session_state))?;

    info!("Draining queued jobs");
    worker.shutdown();

    Ok(())
}
