//! Reproduces the lock-ordering hazard: two tasks acquiring the same two
//! locks in opposite orders on a pool of exactly two workers. The assertion
//! is bounded-time NON-completion: the deadlock is the expected result,
//! not an error.
//!
//! This test must not call `shutdown` (it would stall on the deadlocked
//! workers forever). Dropping the pool detaches the workers and process
//! exit reaps them.

use std::time::Duration;

use gauntlet::config::PoolConfig;
use gauntlet::error::PoolError;
use gauntlet::logging;
use gauntlet::pool::WorkerPool;
use gauntlet::task::{LockHandle, Task};

#[test]
fn inverted_lock_pair_deadlocks_two_workers() {
    logging::init_test();
    let pool = WorkerPool::new(PoolConfig::default()).expect("pool");
    let a = LockHandle::default();
    let b = LockHandle::default();

    // Each worker takes its first lock, holds it well past the other's
    // acquisition, then blocks forever on its second.
    let hold = Duration::from_millis(250);
    let first = pool
        .submit(Task::lock_pair(a.clone(), b.clone(), hold))
        .expect("submit");
    let second = pool.submit(Task::lock_pair(b, a, hold)).expect("submit");

    let wait = Duration::from_millis(800);
    assert!(
        matches!(first.join_timeout(wait), Err(PoolError::JoinTimeout(_))),
        "first lock pair unexpectedly completed"
    );
    assert!(
        matches!(
            second.join_timeout(Duration::from_millis(50)),
            Err(PoolError::JoinTimeout(_))
        ),
        "second lock pair unexpectedly completed"
    );

    // Both tasks are still counted: neither worker ever finished.
    assert_eq!(pool.pending_tasks(), 2);
}

#[test]
fn same_order_lock_pairs_complete() {
    logging::init_test();
    let pool = WorkerPool::new(PoolConfig::default()).expect("pool");
    let a = LockHandle::default();
    let b = LockHandle::default();

    let hold = Duration::from_millis(20);
    let first = pool
        .submit(Task::lock_pair(a.clone(), b.clone(), hold))
        .expect("submit");
    let second = pool.submit(Task::lock_pair(a, b, hold)).expect("submit");

    let wait = Duration::from_secs(2);
    assert_eq!(first.join_timeout(wait).expect("join"), Ok(0));
    assert_eq!(second.join_timeout(wait).expect("join"), Ok(0));
    pool.shutdown().expect("shutdown");
}
