// Gauntlet: a harness that exercises a fixed-size worker pool against
// deliberately varied task behaviors (racing increments of a shared
// counter, contained task-local faults, a lock-ordering deadlock, and an
// unbounded blocking read) to validate that per-task failures stay
// isolated and that access to shared state is serialized.

pub mod config;
pub mod error;
pub mod harness;
pub mod logging;
pub mod pool;
pub mod store;
pub mod task;

// Re-export commonly used types
pub use config::PoolConfig;
pub use error::{PoolError, TaskFault};
pub use pool::{PoolMetrics, PoolStatus, TaskHandle, TaskId, WorkerPool};
pub use store::SharedCounterStore;
pub use task::{Task, TaskOutcome, FAILURE_SENTINEL};
