use clap::Parser;

use gauntlet::config::{PoolConfig, DEFAULT_POOL_SIZE};
use gauntlet::{harness, logging};

/// Exercises a fixed-size worker pool against deliberately hostile task
/// behaviors: racing increments, contained faults, an inverted lock pair,
/// and a blocking stdin read.
///
/// The lock inversion and the stdin read are genuine liveness hazards: with
/// the default two workers, shutdown is expected to stall until the process
/// is fed a line on stdin or killed.
#[derive(Debug, Parser)]
#[command(name = "gauntlet", version, about)]
struct Args {
    /// Number of worker threads in the pool.
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE)]
    workers: usize,
}

fn main() -> anyhow::Result<()> {
    logging::init_default();
    let args = Args::parse();

    let config = PoolConfig::default().with_pool_size(args.workers);
    harness::run(config)?;
    Ok(())
}
