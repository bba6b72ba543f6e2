//! Background worker
//!
//! One tokio task owns the engine and runs submitted jobs one at a time. Every
//! submission gets a oneshot receiver that resolves exactly once, with the
//! job's output or the single error that ended it.

use super::job::{JobRequest, Symbolicator};
use crate::domain::{ReportOutput, SymbolicationError};
use crate::symbolization::SymbolTools;
use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Jobs that may wait behind the running one
const JOB_QUEUE_DEPTH: usize = 16;

pub type JobResult = Result<ReportOutput, SymbolicationError>;

type Job = (JobRequest, oneshot::Sender<JobResult>);

pub struct Worker {
    jobs: mpsc::Sender<Job>,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Move `engine` onto its own task
    #[must_use]
    pub fn spawn<T: SymbolTools + 'static>(engine: Symbolicator<T>) -> Self {
        let (jobs, mut queue) = mpsc::channel::<Job>(JOB_QUEUE_DEPTH);

        let handle = tokio::spawn(async move {
            while let Some((request, reply)) = queue.recv().await {
                debug!("Worker picked up {}", request.report.display());
                let result = engine.symbolicate(&request).await;
                if reply.send(result).is_err() {
                    debug!("Submitter of {} stopped waiting", request.report.display());
                }
            }
            debug!("Worker queue closed");
        });

        Self { jobs, handle }
    }

    /// Queue a job; the receiver yields its completion
    pub async fn submit(&self, request: JobRequest) -> oneshot::Receiver<JobResult> {
        let (reply, completion) = oneshot::channel();
        if let Err(mpsc::error::SendError((_, reply))) = self.jobs.send((request, reply)).await {
            // The receiver must still resolve once
            let _ = reply.send(Err(SymbolicationError::WorkerStopped));
        }
        completion
    }

    /// Submit a job and wait for it
    ///
    /// # Errors
    /// Returns the job's error, or `WorkerStopped` if the worker died mid-job
    pub async fn run(&self, request: JobRequest) -> JobResult {
        self.submit(request).await.await.unwrap_or(Err(SymbolicationError::WorkerStopped))
    }

    /// Finish queued jobs, then stop
    pub async fn shutdown(self) {
        drop(self.jobs);
        if let Err(e) = self.handle.await {
            warn!("Worker ended abnormally: {e}");
        }
    }
}
