use std::any::Any;
use std::time::Duration;
use thiserror::Error;

/// Faults that stay contained inside a single task.
///
/// A task that hits one of these records it on its handle and finishes
/// normally; nothing here ever crosses the pool boundary as an unhandled
/// fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskFault {
    #[error("absent value dereference: {0}")]
    AbsentValue(String),
    #[error("number parse failed: {0}")]
    NumberParse(String),
    #[error("logic fault: {0}")]
    Logic(String),
    #[error("task panicked: {0}")]
    Panic(String),
}

impl TaskFault {
    /// Short fault-kind tag used in the one-line "caught" warnings.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskFault::AbsentValue(_) => "AbsentValue",
            TaskFault::NumberParse(_) => "NumberParse",
            TaskFault::Logic(_) => "Logic",
            TaskFault::Panic(_) => "Panic",
        }
    }

    /// The fault message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            TaskFault::AbsentValue(msg)
            | TaskFault::NumberParse(msg)
            | TaskFault::Logic(msg)
            | TaskFault::Panic(msg) => msg,
        }
    }

    /// Builds a `Panic` fault from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        TaskFault::Panic(panic_message(payload))
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    }
}

/// Errors related to the worker pool lifecycle.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("thread setup error: {0}")]
    ThreadSetupError(String),
    #[error("pool is shutting down")]
    ShuttingDown,
    #[error("task queue disconnected")]
    Disconnected,
    #[error("task handle was abandoned before resolution")]
    HandleDropped,
    #[error("timed out after {0:?} waiting for task completion")]
    JoinTimeout(Duration),
    #[error("failed during shutdown: {0}")]
    ShutdownError(String),
    #[error("internal pool error: {0}")]
    Other(#[from] anyhow::Error),
}
