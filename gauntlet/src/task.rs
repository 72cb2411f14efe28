use std::collections::HashMap;
use std::io::{self, BufRead};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{panic_message, TaskFault};
use crate::store::SharedCounterStore;

/// Result of one unit of work: a value, or a recorded task-local fault.
pub type TaskOutcome = Result<i64, TaskFault>;

/// Sentinel reported for any failed task in summary output.
pub const FAILURE_SENTINEL: i64 = -1;

/// Projects an outcome onto the sentinel convention: failures read as `-1`.
pub fn sentinel_value(outcome: &TaskOutcome) -> i64 {
    outcome.as_ref().map_or(FAILURE_SENTINEL, |value| *value)
}

/// How long `LockPair` holds its first lock before going for the second.
pub const DEFAULT_LOCK_HOLD: Duration = Duration::from_millis(50);

/// A mutual-exclusion resource shared between `LockPair` tasks. The two
/// handles given to a pair of tasks carry no inherent global order.
pub type LockHandle = Arc<Mutex<()>>;

/// One unit of work for the pool.
///
/// Every variant contains its own faults: whatever goes wrong inside a task
/// is caught in the task body, logged as a warning, and recorded as a
/// `TaskFault` outcome. The pool's boundary guard exists only as hardening
/// for jobs that break this contract.
///
/// Two variants are deliberate liveness hazards rather than fault sources:
/// `LockPair` (when two instances acquire the same locks in opposite
/// orders) and `BlockingRead` (an unbounded wait on stdin). Neither raises
/// anything catchable; they stall the worker that runs them, and that stall
/// is the property under test.
#[derive(Debug)]
pub enum Task {
    /// Serialized increment of a shared counter.
    Increment {
        store: Arc<SharedCounterStore>,
        key: String,
    },
    /// Dereferences a value that is never present; the miss is caught and
    /// recorded.
    AbsentValue,
    /// Parses `raw` as an integer; malformed input is caught and recorded.
    ParseNumber { raw: String },
    /// Acquires `first`, holds it for `hold`, then acquires `second` and
    /// releases both in reverse order.
    ///
    /// Acquisition order is exactly as given. Submitting `(a, b)` and
    /// `(b, a)` to a two-worker pool is a real, reproducible deadlock once
    /// each worker holds its first lock: both block forever awaiting the
    /// other's. The variant preserves that hazard; it must not be "fixed"
    /// with a canonical lock order.
    LockPair {
        first: LockHandle,
        second: LockHandle,
        hold: Duration,
    },
    /// Blocks the worker on one line of process stdin, then echoes it.
    ///
    /// No timeout and no cancellation: if input never arrives the worker
    /// slot stays occupied for the life of the process. Known resource
    /// hazard, documented rather than worked around.
    BlockingRead,
    /// Raises a panic and catches it inside the task body.
    RecoveredPanic,
}

impl Task {
    pub fn increment(store: Arc<SharedCounterStore>, key: impl Into<String>) -> Self {
        Task::Increment {
            store,
            key: key.into(),
        }
    }

    pub fn parse_number(raw: impl Into<String>) -> Self {
        Task::ParseNumber { raw: raw.into() }
    }

    pub fn lock_pair(first: LockHandle, second: LockHandle, hold: Duration) -> Self {
        Task::LockPair {
            first,
            second,
            hold,
        }
    }

    /// Short tag for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Task::Increment { .. } => "increment",
            Task::AbsentValue => "absent-value",
            Task::ParseNumber { .. } => "parse-number",
            Task::LockPair { .. } => "lock-pair",
            Task::BlockingRead => "blocking-read",
            Task::RecoveredPanic => "recovered-panic",
        }
    }

    /// Runs the task to completion on the calling thread.
    pub fn run(self) -> TaskOutcome {
        match self {
            Task::Increment { store, key } => Ok(store.increment(&key) as i64),
            Task::AbsentValue => run_absent_value(),
            Task::ParseNumber { raw } => run_parse_number(&raw),
            Task::LockPair {
                first,
                second,
                hold,
            } => run_lock_pair(&first, &second, hold),
            Task::BlockingRead => run_blocking_read(),
            Task::RecoveredPanic => run_recovered_panic(),
        }
    }
}

fn run_absent_value() -> TaskOutcome {
    let settings: HashMap<&str, String> = HashMap::new();
    match settings.get("entry") {
        Some(value) => Ok(value.len() as i64),
        None => {
            let fault = TaskFault::AbsentValue("no value present for \"entry\"".to_string());
            warn!("{} caught: {}", fault.kind(), fault.message());
            Err(fault)
        }
    }
}

fn run_parse_number(raw: &str) -> TaskOutcome {
    match raw.trim().parse::<i64>() {
        Ok(value) => Ok(value),
        Err(err) => {
            let fault = TaskFault::NumberParse(format!("{raw:?}: {err}"));
            warn!("{} caught: {}", fault.kind(), fault.message());
            Err(fault)
        }
    }
}

fn run_lock_pair(first: &LockHandle, second: &LockHandle, hold: Duration) -> TaskOutcome {
    let first_guard = first.lock().unwrap();
    // Holding the first lock across this window is what lines the pair up
    // for the inversion: the peer task takes its own first lock meanwhile.
    thread::sleep(hold);
    let second_guard = second.lock().unwrap();
    info!("acquired both locks");
    drop(second_guard);
    drop(first_guard);
    Ok(0)
}

fn run_blocking_read() -> TaskOutcome {
    println!("Enter something:");
    match read_line_from(&mut io::stdin().lock()) {
        Ok(Some((text, bytes))) => {
            info!("you entered: {text}");
            Ok(bytes as i64)
        }
        Ok(None) => {
            info!("stdin closed before any input arrived");
            Ok(0)
        }
        Err(err) => {
            let fault = TaskFault::Logic(format!("stdin read failed: {err}"));
            warn!("{} caught: {}", fault.kind(), fault.message());
            Err(fault)
        }
    }
}

fn run_recovered_panic() -> TaskOutcome {
    let result = catch_unwind(AssertUnwindSafe(|| {
        panic!("synthetic logic fault");
    }));
    match result {
        Ok(()) => Ok(0),
        Err(payload) => {
            let fault = TaskFault::Logic(panic_message(payload));
            warn!("{} caught: {}", fault.kind(), fault.message());
            Err(fault)
        }
    }
}

/// Consumes one line from `reader`, returning the trimmed text and the raw
/// byte count. `Ok(None)` means the stream reached end of input.
///
/// `BlockingRead` feeds this stdin; tests feed it an in-memory reader.
pub fn read_line_from<R: BufRead>(reader: &mut R) -> io::Result<Option<(String, usize)>> {
    let mut line = String::new();
    let bytes = reader.read_line(&mut line)?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some((line.trim_end_matches(['\r', '\n']).to_string(), bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_number_accepts_valid_input() {
        assert_eq!(Task::parse_number(" 100 ").run(), Ok(100));
    }

    #[test]
    fn parse_number_records_malformed_input() {
        let outcome = Task::parse_number("ABC").run();
        match outcome {
            Err(TaskFault::NumberParse(msg)) => assert!(msg.contains("ABC")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn absent_value_records_the_miss() {
        let outcome = Task::AbsentValue.run();
        assert!(matches!(outcome, Err(TaskFault::AbsentValue(_))));
        assert_eq!(sentinel_value(&outcome), FAILURE_SENTINEL);
    }

    #[test]
    fn recovered_panic_stays_inside_the_task() {
        let outcome = Task::RecoveredPanic.run();
        match outcome {
            Err(TaskFault::Logic(msg)) => assert!(msg.contains("synthetic logic fault")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn lock_pair_in_one_order_completes() {
        let a = LockHandle::default();
        let b = LockHandle::default();
        let outcome = Task::lock_pair(a, b, Duration::from_millis(1)).run();
        assert_eq!(outcome, Ok(0));
    }

    #[test]
    fn read_line_trims_terminators() {
        let mut input = Cursor::new(b"hello\r\nrest".to_vec());
        let (text, bytes) = read_line_from(&mut input).unwrap().unwrap();
        assert_eq!(text, "hello");
        assert_eq!(bytes, 7);
    }

    #[test]
    fn read_line_reports_end_of_input() {
        let mut input = Cursor::new(Vec::new());
        assert!(read_line_from(&mut input).unwrap().is_none());
    }

    #[test]
    fn sentinel_projection() {
        assert_eq!(sentinel_value(&Ok(5)), 5);
        assert_eq!(
            sentinel_value(&Err(TaskFault::Logic("x".into()))),
            FAILURE_SENTINEL
        );
    }
}
