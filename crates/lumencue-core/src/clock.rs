//! Clock sources for the dispatch loop
//!
//! Deadlines and voice timings are plain `i64` nanosecond instants. The loop
//! reads the clock once per iteration and hands the same instant to dispatch
//! and every instrument tick.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds per second
pub const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// A source of nanosecond instants
pub trait Clock: Send + Sync {
    /// Current instant in nanoseconds
    fn now_ns(&self) -> i64;
}

/// Wall clock, nanoseconds since the Unix epoch
///
/// Cue senders report their own wall clock, so the local side has to live in
/// the same epoch for the skew computation to be meaningful.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ns(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_nanos() as i64,
            Err(before) => -(before.duration().as_nanos() as i64),
        }
    }
}

/// Manually driven clock for simulations and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `now` nanoseconds
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `delta` nanoseconds
    pub fn advance(&self, delta: i64) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Convert decimal seconds to nanoseconds, truncating toward zero
///
/// Returns `None` for non-finite input or anything outside the `i64` range.
pub fn seconds_to_nanos(seconds: f64) -> Option<i64> {
    let nanos = seconds * NANOS_PER_SECOND;
    // i64::MIN is exactly -2^63 as a float, i64::MAX rounds up to 2^63
    if nanos >= i64::MIN as f64 && nanos < i64::MAX as f64 {
        Some(nanos as i64)
    } else {
        None
    }
}
