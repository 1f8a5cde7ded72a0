//! Snapshot persistence strategy resolved from the selected backend.
//!
//! # Invariants
//! - Every write carries a full document snapshot taken at request time,
//!   so out-of-order completion can never lose a mutation that an earlier
//!   snapshot did not already contain.
//! - Structured writes run on one writer thread in request order; fallback
//!   writes run inline on the caller's thread.
//! - Dropping the persister flushes every queued snapshot before returning.

use crate::backend::{BackendError, BackendKind, StorageBackend};
use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Instant;

const WRITER_THREAD_NAME: &str = "agencyos-persist";

/// Failure observed through `PersistTicket::wait`.
#[derive(Debug)]
pub enum PersistError {
    Backend(BackendError),
    Serialize(serde_json::Error),
    /// The writer thread stopped before reporting a result.
    WriterGone,
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize document: {err}"),
            Self::WriterGone => write!(f, "persistence writer stopped before completing"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::WriterGone => None,
        }
    }
}

/// Completion handle for one persist request.
///
/// Callers may drop it (fire-and-forget) or `wait` on it.
#[derive(Debug)]
pub struct PersistTicket {
    done: Receiver<Result<(), PersistError>>,
}

impl PersistTicket {
    fn completed(result: Result<(), PersistError>) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self { done: rx }
    }

    pub(crate) fn failed(err: PersistError) -> Self {
        Self::completed(Err(err))
    }

    /// Blocks until the write for this snapshot finishes.
    pub fn wait(self) -> Result<(), PersistError> {
        self.done.recv().unwrap_or(Err(PersistError::WriterGone))
    }

    /// Returns the result if the write already finished.
    pub fn try_result(&self) -> Option<Result<(), PersistError>> {
        self.done.try_recv().ok()
    }
}

struct WriteJob {
    snapshot: Vec<u8>,
    done: Sender<Result<(), PersistError>>,
}

enum Mode {
    Inline(Box<dyn StorageBackend>),
    Background {
        jobs: Option<Sender<WriteJob>>,
        worker: Option<JoinHandle<()>>,
    },
}

pub(crate) struct Persister {
    kind: BackendKind,
    mode: Mode,
}

impl Persister {
    /// Wraps `backend` in the write strategy matching its kind.
    pub(crate) fn new(backend: Box<dyn StorageBackend>) -> std::io::Result<Self> {
        let kind = backend.kind();
        let mode = match kind {
            BackendKind::Fallback => Mode::Inline(backend),
            BackendKind::Structured => {
                let (jobs, queue) = mpsc::channel::<WriteJob>();
                let worker = std::thread::Builder::new()
                    .name(WRITER_THREAD_NAME.to_string())
                    .spawn(move || run_writer(backend, queue))?;
                Mode::Background {
                    jobs: Some(jobs),
                    worker: Some(worker),
                }
            }
        };
        Ok(Self { kind, mode })
    }

    pub(crate) fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Queues (or performs) the write of one serialized snapshot.
    pub(crate) fn submit(&mut self, snapshot: Vec<u8>) -> PersistTicket {
        let key = self.kind.state_key();
        match &mut self.mode {
            Mode::Inline(backend) => {
                let result = write_snapshot(backend.as_mut(), key, &snapshot);
                PersistTicket::completed(result)
            }
            Mode::Background { jobs, .. } => {
                let (done, done_rx) = mpsc::channel();
                let job = WriteJob { snapshot, done };
                match jobs.as_ref().map(|sender| sender.send(job)) {
                    Some(Ok(())) => PersistTicket { done: done_rx },
                    _ => {
                        error!(
                            "event=persist module=store status=error kind={} \
                             error_code=writer_gone",
                            self.kind
                        );
                        PersistTicket::failed(PersistError::WriterGone)
                    }
                }
            }
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        if let Mode::Background { jobs, worker } = &mut self.mode {
            // Closing the channel lets the writer drain the queue and exit.
            jobs.take();
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }
    }
}

fn run_writer(mut backend: Box<dyn StorageBackend>, queue: Receiver<WriteJob>) {
    let key = backend.kind().state_key();
    for job in queue {
        let result = write_snapshot(backend.as_mut(), key, &job.snapshot);
        let _ = job.done.send(result);
    }
}

fn write_snapshot(
    backend: &mut dyn StorageBackend,
    key: &str,
    snapshot: &[u8],
) -> Result<(), PersistError> {
    let started_at = Instant::now();
    match backend.put(key, snapshot) {
        Ok(()) => {
            debug!(
                "event=persist module=store status=ok kind={} bytes={} duration_ms={}",
                backend.kind(),
                snapshot.len(),
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=persist module=store status=error kind={} duration_ms={} error={}",
                backend.kind(),
                started_at.elapsed().as_millis(),
                err
            );
            Err(PersistError::Backend(err))
        }
    }
}
