//! Request statistics of a transport.
//!
//! Counts logical calls per call type, host failovers by cause, cache hits
//! and the latency of successful calls. A one second sliding window gives
//! the current call rate.

use crate::host::{CallType, Outcome};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const RATE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct CallCounters {
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl CallCounters {
    fn load(&self) -> (u64, u64) {
        (
            self.succeeded.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        )
    }
}

/// Statistics shared by every client built on one transport.
#[derive(Debug)]
pub struct StatsTracker {
    started: Instant,
    reads: CallCounters,
    writes: CallCounters,
    timeouts: AtomicU64,
    host_errors: AtomicU64,
    cache_hits: AtomicU64,
    latency_us: AtomicU64,
    window: Mutex<VecDeque<Instant>>,
}

impl StatsTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            reads: CallCounters::default(),
            writes: CallCounters::default(),
            timeouts: AtomicU64::new(0),
            host_errors: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            latency_us: AtomicU64::new(0),
            window: Mutex::new(VecDeque::new()),
        }
    }

    fn counters(&self, call_type: CallType) -> &CallCounters {
        match call_type {
            CallType::Read => &self.reads,
            CallType::Write => &self.writes,
        }
    }

    /// A call answered, `latency` covering every attempt.
    pub fn record_success(&self, call_type: CallType, latency: Duration) {
        self.counters(call_type)
            .succeeded
            .fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.latency_us.fetch_add(micros, Ordering::Relaxed);
        self.tick();
    }

    /// A call ended in an error.
    pub fn record_failure(&self, call_type: CallType) {
        self.counters(call_type).failed.fetch_add(1, Ordering::Relaxed);
        self.tick();
    }

    /// An attempt moved on to the next host.
    pub fn record_failover(&self, outcome: Outcome) {
        match outcome {
            Outcome::Timeout => self.timeouts.fetch_add(1, Ordering::Relaxed),
            Outcome::Retryable | Outcome::Success => {
                self.host_errors.fetch_add(1, Ordering::Relaxed)
            }
        };
    }

    /// A read was served from the cache.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn tick(&self) {
        let now = Instant::now();
        let mut window = self.window.lock();
        window.push_back(now);
        Self::expire(&mut window, now);
    }

    fn expire(window: &mut VecDeque<Instant>, now: Instant) {
        let Some(cutoff) = now.checked_sub(RATE_WINDOW) else {
            return;
        };
        while window.front().is_some_and(|t| *t < cutoff) {
            window.pop_front();
        }
    }

    /// Calls completed during the last second.
    pub fn current_rate(&self) -> f64 {
        let mut window = self.window.lock();
        Self::expire(&mut window, Instant::now());
        window.len() as f64
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let (reads_ok, reads_failed) = self.reads.load();
        let (writes_ok, writes_failed) = self.writes.load();
        let success_count = reads_ok + writes_ok;
        let timeouts = self.timeouts.load(Ordering::Relaxed);
        let host_errors = self.host_errors.load(Ordering::Relaxed);

        let avg_latency_ms = if success_count == 0 {
            0.0
        } else {
            self.latency_us.load(Ordering::Relaxed) as f64 / success_count as f64 / 1000.0
        };

        StatsSnapshot {
            elapsed: self.started.elapsed(),
            reads: reads_ok + reads_failed,
            writes: writes_ok + writes_failed,
            total_processed: success_count + reads_failed + writes_failed,
            success_count,
            failure_count: reads_failed + writes_failed,
            retry_count: timeouts + host_errors,
            timeouts,
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            avg_latency_ms,
            current_rps: self.current_rate(),
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters of a [`StatsTracker`] at one point in time.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    /// Time since the transport was built.
    pub elapsed: Duration,
    /// Read calls completed.
    pub reads: u64,
    /// Write calls completed.
    pub writes: u64,
    /// Calls completed, successful or not.
    pub total_processed: u64,
    /// Calls answered.
    pub success_count: u64,
    /// Calls ended in an error.
    pub failure_count: u64,
    /// Host failovers of any cause.
    pub retry_count: u64,
    /// Failovers caused by a timeout.
    pub timeouts: u64,
    /// Reads served from the cache, not counted as calls.
    pub cache_hits: u64,
    /// Average latency of answered calls, in milliseconds.
    pub avg_latency_ms: f64,
    /// Calls completed during the last second.
    pub current_rps: f64,
}

impl StatsSnapshot {
    /// Share of answered calls, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            return 100.0;
        }
        self.success_count as f64 * 100.0 / self.total_processed as f64
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "Calls: {} ({} reads, {} writes) | Failed: {} | Failovers: {} ({} timeouts) | Avg Latency: {:.1}ms",
            self.total_processed,
            self.reads,
            self.writes,
            self.failure_count,
            self.retry_count,
            self.timeouts,
            self.avg_latency_ms
        )
    }
}
