use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use gauntlet::config::PoolConfig;
use gauntlet::error::{PoolError, TaskFault};
use gauntlet::logging;
use gauntlet::pool::{PoolStatus, WorkerPool};
use gauntlet::store::SharedCounterStore;
use gauntlet::task::{sentinel_value, Task, FAILURE_SENTINEL};

fn two_worker_pool() -> WorkerPool {
    WorkerPool::new(PoolConfig::default()).expect("pool")
}

#[test]
fn two_increments_resolve_to_one_and_two() {
    logging::init_test();
    let pool = two_worker_pool();
    let store = Arc::new(SharedCounterStore::new());

    let first = pool
        .submit(Task::increment(store.clone(), "k"))
        .expect("submit");
    let second = pool
        .submit(Task::increment(store.clone(), "k"))
        .expect("submit");

    let values: HashSet<i64> = [first, second]
        .iter()
        .map(|handle| handle.join().expect("join").expect("outcome"))
        .collect();

    assert_eq!(values, HashSet::from([1, 2]));
    assert_eq!(store.get("k"), 2);
    pool.shutdown().expect("shutdown");
}

#[test]
fn concurrent_increments_return_gapless_values() {
    logging::init_test();
    let pool = WorkerPool::new(PoolConfig::default().with_pool_size(4)).expect("pool");
    let store = Arc::new(SharedCounterStore::new());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            pool.submit(Task::increment(store.clone(), "k"))
                .expect("submit")
        })
        .collect();

    let mut values: Vec<i64> = handles
        .iter()
        .map(|handle| handle.join().expect("join").expect("outcome"))
        .collect();
    values.sort_unstable();

    assert_eq!(values, (1..=16).collect::<Vec<i64>>());
    assert_eq!(store.get("k"), 16);
    pool.shutdown().expect("shutdown");
}

#[test]
fn parse_failure_is_contained() {
    logging::init_test();
    let pool = two_worker_pool();

    let handle = pool.submit(Task::parse_number("ABC")).expect("submit");
    let outcome = handle.join().expect("join");

    match &outcome {
        Err(TaskFault::NumberParse(msg)) => assert!(msg.contains("ABC")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(sentinel_value(&outcome), FAILURE_SENTINEL);

    // The pool keeps serving work after the contained fault.
    let store = Arc::new(SharedCounterStore::new());
    let after = pool
        .submit(Task::increment(store.clone(), "k"))
        .expect("submit");
    assert_eq!(after.join().expect("join").expect("outcome"), 1);
    pool.shutdown().expect("shutdown");
}

#[test]
fn absent_value_is_contained() {
    logging::init_test();
    let pool = two_worker_pool();

    let handle = pool.submit(Task::AbsentValue).expect("submit");
    let outcome = handle.join().expect("join");

    assert!(matches!(outcome, Err(TaskFault::AbsentValue(_))));
    assert_eq!(sentinel_value(&outcome), FAILURE_SENTINEL);
    pool.shutdown().expect("shutdown");
}

#[test]
fn recovered_panic_completes_the_task() {
    logging::init_test();
    let pool = two_worker_pool();

    let handle = pool.submit(Task::RecoveredPanic).expect("submit");
    match handle.join().expect("join") {
        Err(TaskFault::Logic(msg)) => assert!(msg.contains("synthetic logic fault")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    pool.shutdown().expect("shutdown");
}

#[test]
fn boundary_guard_records_escaped_panics() {
    logging::init_test();
    let pool = two_worker_pool();

    let violating = pool
        .submit_with(|| panic!("contract violation"))
        .expect("submit");
    match violating.join().expect("join") {
        Err(TaskFault::Panic(msg)) => assert!(msg.contains("contract violation")),
        other => panic!("unexpected outcome: {other:?}"),
    }

    // The worker that hit the panic is still alive and serving.
    let after = pool.submit_with(|| Ok(7)).expect("submit");
    assert_eq!(after.join().expect("join").expect("outcome"), 7);
    pool.shutdown().expect("shutdown");
}

#[test]
fn submit_after_shutdown_is_rejected() {
    logging::init_test();
    let pool = two_worker_pool();
    pool.shutdown().expect("shutdown");

    assert_eq!(pool.status(), PoolStatus::Shutdown);
    assert!(matches!(
        pool.submit(Task::AbsentValue),
        Err(PoolError::ShuttingDown)
    ));
}

#[test]
fn queued_tasks_drain_during_shutdown() {
    logging::init_test();
    let pool = WorkerPool::new(PoolConfig::default().with_pool_size(1)).expect("pool");

    let slow = pool
        .submit_with(|| {
            std::thread::sleep(Duration::from_millis(100));
            Ok(1)
        })
        .expect("submit");
    let queued = pool.submit_with(|| Ok(2)).expect("submit");

    pool.shutdown().expect("shutdown");

    assert_eq!(slow.join().expect("join").expect("outcome"), 1);
    assert_eq!(queued.join().expect("join").expect("outcome"), 2);
    assert_eq!(pool.pending_tasks(), 0);
}

#[test]
fn metrics_reflect_pool_state() {
    logging::init_test();
    let pool = two_worker_pool();
    let metrics = pool.metrics();
    assert_eq!(metrics.pool_size, 2);
    assert_eq!(metrics.status, PoolStatus::Running);
    pool.shutdown().expect("shutdown");
    assert_eq!(pool.metrics().status, PoolStatus::Shutdown);
}

#[test]
fn zero_workers_is_a_setup_error() {
    logging::init_test();
    match WorkerPool::new(PoolConfig::default().with_pool_size(0)) {
        Err(PoolError::ThreadSetupError(_)) => {}
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}
