//! Background worker for batch jobs.
//!
//! Copying images across many targets blocks on disk I/O, so an interactive
//! front end hands batches to a dedicated thread and reads progress back over a
//! channel instead of calling into the engine from its own loop.

use crate::batch::{BatchRunner, CancelToken};
use crate::error::{Result, SplashError};
use crate::model::{BatchResult, FileOutcome};
use crate::replace::FileOperations;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::debug;

#[derive(Debug, Clone)]
pub enum Job {
    ReplaceAll {
        source: PathBuf,
        targets: Vec<PathBuf>,
        protection_enabled: bool,
    },
    RestoreAll {
        targets: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone)]
pub enum WorkerEvent {
    FileDone(FileOutcome),
    BatchDone(BatchResult),
}

pub struct Worker {
    jobs: Option<Sender<Job>>,
    events: Receiver<WorkerEvent>,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Moves `runner` onto its own thread. The thread exits when the worker is
    /// dropped.
    pub fn spawn<E>(runner: BatchRunner<E>) -> Self
    where
        E: FileOperations + Send + 'static,
    {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();

        let handle = thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                let progress = event_tx.clone();
                let on_file = move |file: &FileOutcome| {
                    let _ = progress.send(WorkerEvent::FileDone(file.clone()));
                };
                let result = match job {
                    Job::ReplaceAll {
                        source,
                        targets,
                        protection_enabled,
                    } => runner.replace_all_with(
                        &source,
                        &targets,
                        protection_enabled,
                        &worker_cancel,
                        on_file,
                    ),
                    Job::RestoreAll { targets } => {
                        runner.restore_all_with(&targets, &worker_cancel, on_file)
                    }
                };
                if event_tx.send(WorkerEvent::BatchDone(result)).is_err() {
                    break;
                }
            }
            debug!("batch worker stopped");
        });

        Self {
            jobs: Some(job_tx),
            events: event_rx,
            cancel,
            handle: Some(handle),
        }
    }

    /// Queues a job. Clears any earlier cancellation first.
    pub fn submit(&self, job: Job) -> Result<()> {
        self.cancel.reset();
        self.jobs
            .as_ref()
            .ok_or_else(|| SplashError::Api("worker is shut down".into()))?
            .send(job)
            .map_err(|_| SplashError::Api("worker thread has stopped".into()))
    }

    pub fn events(&self) -> &Receiver<WorkerEvent> {
        &self.events
    }

    /// Cancels the running batch after its current file.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Submits a job and waits for its summary, handing each per-file outcome
    /// to `on_file` as it arrives.
    pub fn run<F: FnMut(&FileOutcome)>(&self, job: Job, mut on_file: F) -> Result<BatchResult> {
        self.submit(job)?;
        loop {
            match self.events.recv() {
                Ok(WorkerEvent::FileDone(file)) => on_file(&file),
                Ok(WorkerEvent::BatchDone(result)) => return Ok(result),
                Err(_) => return Err(SplashError::Api("worker thread has stopped".into())),
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
