/// Default number of worker threads in the pool.
pub const DEFAULT_POOL_SIZE: usize = 2;

/// Prefix for worker thread names ("<prefix>-<id>").
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "gauntlet-worker";

/// Configuration for the `WorkerPool`.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// The number of worker threads draining the shared task queue.
    pub pool_size: usize,

    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl PoolConfig {
    /// Pool sized to the machine instead of the fixed default.
    pub fn auto() -> Self {
        Self {
            pool_size: num_cpus::get().max(1),
            ..Self::default()
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }
}
