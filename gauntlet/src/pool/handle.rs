use std::fmt;
use std::time::Duration;

use uuid::Uuid;

use crate::error::PoolError;
use crate::task::TaskOutcome;

/// Identity of one submission, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    pub(crate) fn next() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The eventual outcome of one submitted task.
///
/// Created at submission time and resolved exactly once, by the worker that
/// ran the task; immutable after resolution. Dropping a handle abandons the
/// outcome without affecting the task; the worker's resolution send is
/// allowed to fail silently, mirroring an asker that stopped waiting.
#[derive(Debug)]
pub struct TaskHandle {
    id: TaskId,
    outcome: flume::Receiver<TaskOutcome>,
}

impl TaskHandle {
    pub(crate) fn channel(id: TaskId) -> (flume::Sender<TaskOutcome>, TaskHandle) {
        let (reply, outcome) = flume::bounded(1);
        (reply, TaskHandle { id, outcome })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Blocks until the task finishes.
    ///
    /// `HandleDropped` means the resolving side went away without sending,
    /// which the worker loop does not do; it is reachable only by joining
    /// the same handle twice.
    pub fn join(&self) -> Result<TaskOutcome, PoolError> {
        self.outcome.recv().map_err(|_| PoolError::HandleDropped)
    }

    /// Bounded-time wait, for liveness checks over tasks that may never
    /// finish (a deadlocked lock pair, an unserved blocking read). A timeout
    /// is an observation, not an error in the task.
    pub fn join_timeout(&self, timeout: Duration) -> Result<TaskOutcome, PoolError> {
        self.outcome.recv_timeout(timeout).map_err(|err| match err {
            flume::RecvTimeoutError::Timeout => PoolError::JoinTimeout(timeout),
            flume::RecvTimeoutError::Disconnected => PoolError::HandleDropped,
        })
    }

    /// Non-blocking poll for the outcome.
    pub fn try_join(&self) -> Option<TaskOutcome> {
        self.outcome.try_recv().ok()
    }
}
