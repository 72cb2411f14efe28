//! Fixed-size worker pool with per-task failure isolation.
//!
//! A configurable number of OS threads (default two) drain one shared FIFO
//! queue. `submit` enqueues and returns immediately with a handle that
//! resolves exactly once. There is no priority ordering and no
//! cancellation: once a task starts it runs to completion or blocks
//! indefinitely.
//!
//! `shutdown` stops admissions and then waits for the workers, which drain
//! every task already queued before exiting. A permanently blocked task (a
//! deadlocked lock pair, a blocking read that never gets input) therefore
//! stalls `shutdown` for as long as it stays blocked. That is documented
//! behavior, not a bug: the pool refuses to mask a liveness hazard by
//! abandoning its workers.

mod handle;
mod worker;

pub use handle::{TaskHandle, TaskId};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, info};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::task::{Task, TaskOutcome};
use worker::Worker;

/// Type-erased unit of work as the queue carries it.
pub(crate) type Job = Box<dyn FnOnce() -> TaskOutcome + Send + 'static>;

pub(crate) struct Submission {
    pub(crate) id: TaskId,
    pub(crate) job: Job,
    pub(crate) reply: flume::Sender<TaskOutcome>,
}

/// Lifecycle states of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    Running = 0,
    ShuttingDown = 1,
    Shutdown = 2,
}

/// Point-in-time view of the pool, for logs and assertions.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    pub pool_size: usize,
    pub pending_tasks: usize,
    pub status: PoolStatus,
}

pub struct WorkerPool {
    pool_size: usize,

    /// Sending half of the shared queue. Taken (and dropped) on shutdown;
    /// closing the queue is the stop signal the workers watch for.
    injector: Mutex<Option<flume::Sender<Submission>>>,

    workers: Mutex<Vec<JoinHandle<()>>>,

    /// Tasks submitted but not yet finished (queued or running).
    pending: Arc<AtomicUsize>,

    status: AtomicUsize,
}

impl WorkerPool {
    /// Spawns `config.pool_size` named worker threads over one shared
    /// queue.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        if config.pool_size == 0 {
            return Err(PoolError::ThreadSetupError(
                "pool needs at least one worker".to_string(),
            ));
        }

        let (injector, queue) = flume::unbounded();
        let pending = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(config.pool_size);
        for worker_id in 0..config.pool_size {
            let worker = Worker::new(worker_id, queue.clone(), pending.clone());
            workers.push(worker.spawn(&config.thread_name_prefix)?);
        }

        debug!(pool_size = config.pool_size, "worker pool started");
        Ok(Self {
            pool_size: config.pool_size,
            injector: Mutex::new(Some(injector)),
            workers: Mutex::new(workers),
            pending,
            status: AtomicUsize::new(PoolStatus::Running as usize),
        })
    }

    /// Enqueues `task` and returns immediately with its handle. Admission
    /// is FIFO as workers become available.
    pub fn submit(&self, task: Task) -> Result<TaskHandle, PoolError> {
        let kind = task.kind();
        let handle = self.submit_with(move || task.run())?;
        debug!(task = %handle.id(), kind, "task submitted");
        Ok(handle)
    }

    /// Closure-level submission surface that `submit` rides on.
    ///
    /// Jobs are expected to return their own tagged outcome; a panic that
    /// escapes a job anyway is intercepted at the worker boundary and
    /// recorded as a `TaskFault::Panic` on the handle.
    pub fn submit_with<F>(&self, job: F) -> Result<TaskHandle, PoolError>
    where
        F: FnOnce() -> TaskOutcome + Send + 'static,
    {
        if self.status() != PoolStatus::Running {
            return Err(PoolError::ShuttingDown);
        }

        let injector = self.injector.lock().unwrap();
        let Some(sender) = injector.as_ref() else {
            return Err(PoolError::ShuttingDown);
        };

        let id = TaskId::next();
        let (reply, handle) = TaskHandle::channel(id);
        self.pending.fetch_add(1, Ordering::Relaxed);

        let submission = Submission {
            id,
            job: Box::new(job),
            reply,
        };
        if sender.send(submission).is_err() {
            self.pending.fetch_sub(1, Ordering::Relaxed);
            return Err(PoolError::Disconnected);
        }
        Ok(handle)
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Tasks submitted but not yet finished.
    pub fn pending_tasks(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> PoolStatus {
        match self.status.load(Ordering::Relaxed) {
            0 => PoolStatus::Running,
            1 => PoolStatus::ShuttingDown,
            _ => PoolStatus::Shutdown,
        }
    }

    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            pool_size: self.pool_size,
            pending_tasks: self.pending_tasks(),
            status: self.status(),
        }
    }

    /// Stops accepting submissions, lets the workers drain everything
    /// already queued, and joins them.
    ///
    /// Blocks the caller until every previously submitted task has
    /// completed, which means a permanently blocked task prevents this
    /// from returning promptly. Callers that only want to abandon the pool
    /// can drop it instead; see `Drop`.
    pub fn shutdown(&self) -> Result<(), PoolError> {
        if self
            .status
            .compare_exchange(
                PoolStatus::Running as usize,
                PoolStatus::ShuttingDown as usize,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            return Err(PoolError::ShuttingDown);
        }

        // Closing the queue is the shutdown signal: workers exit once the
        // queue is empty and disconnected.
        drop(self.injector.lock().unwrap().take());

        let workers = {
            let mut guard = self.workers.lock().unwrap();
            std::mem::take(&mut *guard)
        };

        let mut failures = Vec::new();
        for handle in workers {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                // The worker loop catches job panics, so this is a broken
                // invariant rather than an expected path.
                failures.push(name);
            }
        }

        self.status
            .store(PoolStatus::Shutdown as usize, Ordering::SeqCst);

        if failures.is_empty() {
            info!("worker pool shut down");
            Ok(())
        } else {
            Err(PoolError::ShutdownError(format!(
                "worker threads exited abnormally: {}",
                failures.join(", ")
            )))
        }
    }
}

impl Drop for WorkerPool {
    /// Signals the workers without joining them.
    ///
    /// Detaching keeps a dropped pool that still holds a deadlocked pair
    /// from hanging the owning thread; the detached workers drain whatever
    /// they can and die with the process.
    fn drop(&mut self) {
        if self.status() == PoolStatus::Running {
            self.status
                .store(PoolStatus::ShuttingDown as usize, Ordering::SeqCst);
            drop(self.injector.lock().unwrap().take());
            debug!("worker pool dropped without shutdown; workers detached");
        }
    }
}
