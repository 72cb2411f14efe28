//! Deterministic demonstration sequence over the pool.
//!
//! The sequence is fixed: two racing increments of one key, the two
//! contained-fault variants, an inverted lock pair sharing two locks, a
//! recovered panic, and a blocking stdin read. With the default two workers
//! the inverted pair is expected to deadlock both of them, so the final
//! `shutdown` stalls. That stall is the hazard the harness exists to
//! demonstrate, and it is announced up front in the log.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::pool::{TaskHandle, WorkerPool};
use crate::store::SharedCounterStore;
use crate::task::{sentinel_value, LockHandle, Task, TaskOutcome, DEFAULT_LOCK_HOLD};

/// How long the drain waits on each handle before declaring it pending.
/// Generous relative to the 50 ms lock hold, so everything that can finish
/// has finished.
pub const DRAIN_WAIT: Duration = Duration::from_millis(500);

pub struct Harness {
    pool: WorkerPool,
    store: Arc<SharedCounterStore>,
    submitted: Vec<(&'static str, TaskHandle)>,
}

impl Harness {
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        Ok(Self {
            pool: WorkerPool::new(config)?,
            store: Arc::new(SharedCounterStore::new()),
            submitted: Vec::new(),
        })
    }

    pub fn store(&self) -> &Arc<SharedCounterStore> {
        &self.store
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    fn submit(&mut self, label: &'static str, task: Task) -> Result<(), PoolError> {
        let handle = self.pool.submit(task)?;
        self.submitted.push((label, handle));
        Ok(())
    }

    /// Two increments of the same key, racing for the store's critical
    /// section.
    pub fn submit_counter_pair(&mut self, key: &str) -> Result<(), PoolError> {
        self.submit("increment#1", Task::increment(self.store.clone(), key))?;
        self.submit("increment#2", Task::increment(self.store.clone(), key))
    }

    /// The two contained-fault variants.
    pub fn submit_fault_tasks(&mut self) -> Result<(), PoolError> {
        self.submit("absent-value", Task::AbsentValue)?;
        self.submit("parse-number", Task::parse_number("ABC"))
    }

    /// The inverted lock pair. With two workers this is expected to
    /// deadlock both of them; nothing submitted afterwards will run.
    pub fn submit_lock_inversion(&mut self) -> Result<(), PoolError> {
        let a = LockHandle::default();
        let b = LockHandle::default();
        self.submit(
            "lock-pair(a,b)",
            Task::lock_pair(a.clone(), b.clone(), DEFAULT_LOCK_HOLD),
        )?;
        self.submit("lock-pair(b,a)", Task::lock_pair(b, a, DEFAULT_LOCK_HOLD))
    }

    pub fn submit_recovered_panic(&mut self) -> Result<(), PoolError> {
        self.submit("recovered-panic", Task::RecoveredPanic)
    }

    /// The stdin-bound read. Occupies a worker until a line arrives.
    pub fn submit_blocking_read(&mut self) -> Result<(), PoolError> {
        self.submit("blocking-read", Task::BlockingRead)
    }

    /// The full demonstration, in the same order the pieces are listed
    /// above.
    pub fn submit_demo_sequence(&mut self) -> Result<(), PoolError> {
        self.submit_counter_pair("key1")?;
        self.submit_fault_tasks()?;
        self.submit_lock_inversion()?;
        self.submit_recovered_panic()?;
        self.submit_blocking_read()
    }

    /// Waits a bounded time per task and logs what resolved. Hazard tasks
    /// still pending after the wait are reported, not waited out.
    pub fn drain(&mut self, wait: Duration) -> Vec<(&'static str, Option<TaskOutcome>)> {
        let mut report = Vec::with_capacity(self.submitted.len());
        for (label, handle) in self.submitted.drain(..) {
            match handle.join_timeout(wait) {
                Ok(outcome) => {
                    match &outcome {
                        Ok(value) => info!(task = label, value, "task completed"),
                        Err(fault) => info!(
                            task = label,
                            result = sentinel_value(&outcome),
                            %fault,
                            "task failed and was contained"
                        ),
                    }
                    report.push((label, Some(outcome)));
                }
                Err(PoolError::JoinTimeout(_)) => {
                    warn!(task = label, "still pending; liveness hazard in progress");
                    report.push((label, None));
                }
                Err(err) => {
                    warn!(task = label, error = %err, "task handle unresolved");
                    report.push((label, None));
                }
            }
        }
        report
    }

    /// Logs the current contents of the shared store.
    pub fn report_store(&self) {
        let snapshot = self.store.snapshot();
        info!(entries = snapshot.len(), "shared counter store contents");
        for (key, count) in snapshot {
            info!(key = %key, count, "counter");
        }
    }

    /// Blocking shutdown; stalls for as long as any submitted task does.
    pub fn shutdown(self) -> Result<(), PoolError> {
        self.pool.shutdown()
    }
}

/// Runs the full demonstration: submit, bounded drain, store summary, then
/// the final blocking shutdown (with a post-shutdown summary if it
/// completes).
pub fn run(config: PoolConfig) -> Result<(), PoolError> {
    let mut harness = Harness::new(config)?;
    info!(
        workers = harness.pool().pool_size(),
        "submitting demonstration sequence"
    );
    info!(
        "the inverted lock pair and the stdin read are liveness hazards: \
         shutdown may stall until input arrives or the process is killed"
    );

    harness.submit_demo_sequence()?;
    harness.drain(DRAIN_WAIT);
    harness.report_store();

    info!(
        pending = harness.pool().pending_tasks(),
        "shutting down worker pool"
    );
    let store = harness.store().clone();
    harness.shutdown()?;
    info!(final_state = ?store.snapshot(), "shared state after shutdown");
    Ok(())
}
