// crates/forge-worker/src/worker.rs

use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{info, info_span};
use uuid::Uuid;
use forge_core::JobResult;
use crate::job::JobLifecycleManager;

pub enum WorkerCommand {
    Run {
        id: Uuid,
        input: Value,
        reply: oneshot::Sender<JobResult>,
    },
    Shutdown,
}

/// Cloneable handle for queueing jobs on the worker thread.
#[derive(Clone)]
pub struct JobSubmitter {
    command_tx: Sender<WorkerCommand>,
}

impl JobSubmitter {
    pub fn submit(&self, id: Uuid, input: Value) -> Result<oneshot::Receiver<JobResult>, String> {
        let (reply, result_rx) = oneshot::channel();
        self.command_tx
            .send(WorkerCommand::Run { id, input, reply })
            .map_err(|e| format!("Failed to send job to worker: {}", e))?;
        Ok(result_rx)
    }
}

/// Owns the lifecycle manager on a dedicated thread. Jobs run one at a time,
/// in the order they were submitted.
pub struct JobWorker {
    command_tx: Sender<WorkerCommand>,
    thread_handle: Option<JoinHandle<()>>,
}

impl JobWorker {
    pub fn spawn(manager: JobLifecycleManager) -> Self {
        let (cmd_tx, cmd_rx) = channel::<WorkerCommand>();

        let thread_handle = thread::spawn(move || {
            loop {
                match cmd_rx.recv() {
                    Ok(WorkerCommand::Run { id, input, reply }) => {
                        let _span = info_span!("job", %id).entered();
                        let started = Instant::now();

                        let result = manager.handle(&input);
                        info!(
                            "Job finished ({}) in {:.1}s",
                            if result.is_success() { "ok" } else { "error" },
                            started.elapsed().as_secs_f32()
                        );

                        // The submitter may have given up waiting.
                        let _ = reply.send(result);
                    }
                    Ok(WorkerCommand::Shutdown) => {
                        break;
                    }
                    Err(_) => {
                        break;
                    }
                }
            }
        });

        Self {
            command_tx: cmd_tx,
            thread_handle: Some(thread_handle),
        }
    }

    pub fn submitter(&self) -> JobSubmitter {
        JobSubmitter {
            command_tx: self.command_tx.clone(),
        }
    }

    /// Finish queued jobs, then stop the thread.
    pub fn shutdown(&mut self) {
        let _ = self.command_tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for JobWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
