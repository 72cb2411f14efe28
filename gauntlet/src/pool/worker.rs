use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::error::{PoolError, TaskFault};

use super::Submission;

/// One worker thread in the pool.
///
/// Workers block on the shared queue and run each job to completion. A
/// panic escaping a job is intercepted here: the fault is recorded on the
/// task's handle, logged, and the thread takes the next job. The only
/// things that occupy a worker indefinitely are the documented liveness
/// hazards (a lock inversion or an unserved blocking read), and those are
/// deliberately not interrupted.
pub(crate) struct Worker {
    id: usize,
    queue: flume::Receiver<Submission>,
    pending: Arc<AtomicUsize>,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        queue: flume::Receiver<Submission>,
        pending: Arc<AtomicUsize>,
    ) -> Self {
        Self { id, queue, pending }
    }

    /// Spawns the worker on a named OS thread.
    pub(crate) fn spawn(self, thread_name_prefix: &str) -> Result<JoinHandle<()>, PoolError> {
        let name = format!("{thread_name_prefix}-{}", self.id);
        std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || self.run())
            .map_err(|err| {
                PoolError::ThreadSetupError(format!("failed to spawn {name}: {err}"))
            })
    }

    /// Main loop: exits once the queue is empty and disconnected.
    fn run(self) {
        debug!(worker = self.id, "worker started");
        while let Ok(submission) = self.queue.recv() {
            let Submission { id, job, reply } = submission;
            debug!(worker = self.id, task = %id, "task started");

            let outcome = match catch_unwind(AssertUnwindSafe(|| job())) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    // Boundary guard: the task broke the contract of
                    // containing its own faults. Record it and keep the
                    // worker alive for the next job.
                    let fault = TaskFault::from_panic(payload);
                    warn!("{} caught: {}", fault.kind(), fault.message());
                    Err(fault)
                }
            };

            self.pending.fetch_sub(1, Ordering::Relaxed);
            debug!(worker = self.id, task = %id, "task finished");

            // The handle may have been dropped; an unread outcome is fine.
            let _ = reply.send(outcome);
        }
        debug!(worker = self.id, "worker stopped");
    }
}
