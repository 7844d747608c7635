//! Host ranking for cluster failover.
//!
//! Every API is served by several hosts. The ranker keeps them in their
//! configured order, pushes failed hosts out of rotation until a cooldown
//! has passed, and stretches timeouts for hosts that keep timing out.

use crate::config::HostConfig;
use crate::error::{AlgoliaError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Kind of API call; reads and writes may go to different hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    /// Search, get and browse calls.
    Read,
    /// Indexing and settings calls.
    Write,
}

/// Call types served by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accept {
    /// Reads only.
    Read,
    /// Writes only.
    Write,
    /// Reads and writes.
    #[default]
    ReadWrite,
}

impl Accept {
    /// Whether a host with this setting serves `call_type`.
    #[must_use]
    pub fn allows(self, call_type: CallType) -> bool {
        match self {
            Self::ReadWrite => true,
            Self::Read => call_type == CallType::Read,
            Self::Write => call_type == CallType::Write,
        }
    }
}

/// What happened when a request was sent to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The host answered with a usable response.
    Success,
    /// The host timed out.
    Timeout,
    /// Network failure or 5xx; try the next host.
    Retryable,
}

#[derive(Debug)]
struct HostState {
    up: bool,
    last_use: Instant,
}

/// A single API host with health tracking.
#[derive(Debug)]
pub struct StatefulHost {
    /// Host configuration.
    pub config: HostConfig,
    /// Total successful requests.
    pub success_count: AtomicU64,
    /// Total failed requests.
    pub failure_count: AtomicU64,
    /// Total latency in microseconds.
    pub total_latency_us: AtomicU64,
    state: RwLock<HostState>,
    /// Timeouts since the host was last reset.
    retry_count: AtomicU32,
}

impl StatefulHost {
    /// Create a new host from configuration.
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            state: RwLock::new(HostState {
                up: true,
                last_use: Instant::now(),
            }),
            retry_count: AtomicU32::new(0),
        }
    }

    /// Base URL of the host.
    pub fn base_url(&self) -> String {
        self.config.base_url()
    }

    /// Host name, used in logs.
    pub fn name(&self) -> &str {
        &self.config.url
    }

    /// Check if the host is up.
    pub fn is_up(&self) -> bool {
        self.state.read().up
    }

    /// Number of timeouts since the host was last reset.
    pub fn retry_count(&self) -> u32 {
        self.retry_count.load(Ordering::Relaxed)
    }

    /// Timeout for the next call to this host.
    pub fn timeout_for(&self, base: Duration) -> Duration {
        base * (self.retry_count() + 1)
    }

    /// Put the host back in rotation with a clean slate.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.up = true;
        state.last_use = Instant::now();
        self.retry_count.store(0, Ordering::Relaxed);
    }

    /// Whether the host is down and its cooldown has passed.
    pub fn cooled_down(&self, cooldown: Duration) -> bool {
        let state = self.state.read();
        !state.up && state.last_use.elapsed() >= cooldown
    }

    /// Record a successful request.
    pub fn record_success(&self, latency: Duration) {
        self.success_count.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
        let mut state = self.state.write();
        state.up = true;
        state.last_use = Instant::now();
    }

    /// Record a timeout; the host stays up with a longer timeout.
    pub fn record_timeout(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
        self.retry_count.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.write();
        state.up = true;
        state.last_use = Instant::now();
    }

    /// Record a failure; the host leaves rotation until it cools down.
    pub fn record_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.write();
        state.up = false;
        state.last_use = Instant::now();
    }

    /// Get average latency in milliseconds.
    pub fn avg_latency_ms(&self) -> f64 {
        let total = self.total_latency_us.load(Ordering::Relaxed);
        let count = self.success_count.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            (total as f64 / count as f64) / 1000.0
        }
    }
}

/// Ranked list of hosts for one API.
#[derive(Debug)]
pub struct HostRanker {
    hosts: Vec<Arc<StatefulHost>>,
    cooldown: Duration,
}

impl HostRanker {
    /// Create a ranker; hosts are tried in the given order.
    pub fn new(configs: Vec<HostConfig>, cooldown: Duration) -> Result<Self> {
        if configs.is_empty() {
            return Err(AlgoliaError::InvalidConfig(
                "at least one host is required".to_string(),
            ));
        }

        let hosts = configs
            .into_iter()
            .map(|c| Arc::new(StatefulHost::new(c)))
            .collect();

        Ok(Self { hosts, cooldown })
    }

    /// Hosts to try for a call, best first.
    ///
    /// Down hosts past their cooldown are restored first. If no accepting
    /// host is up, all of them are reset so the call is still attempted.
    pub fn tryable_hosts(&self, call_type: CallType) -> Vec<Arc<StatefulHost>> {
        for host in &self.hosts {
            if host.cooled_down(self.cooldown) {
                host.reset();
            }
        }

        let up: Vec<_> = self
            .hosts
            .iter()
            .filter(|h| h.config.accept.allows(call_type) && h.is_up())
            .cloned()
            .collect();

        if !up.is_empty() {
            return up;
        }

        self.hosts
            .iter()
            .filter(|h| h.config.accept.allows(call_type))
            .inspect(|h| h.reset())
            .cloned()
            .collect()
    }

    /// Apply the outcome of a call to a host.
    pub fn decide(&self, host: &StatefulHost, outcome: Outcome, latency: Duration) {
        match outcome {
            Outcome::Success => host.record_success(latency),
            Outcome::Timeout => host.record_timeout(),
            Outcome::Retryable => host.record_failure(),
        }
    }

    /// Get all hosts.
    pub fn hosts(&self) -> &[Arc<StatefulHost>] {
        &self.hosts
    }

    /// Get the number of hosts currently up.
    pub fn up_count(&self) -> usize {
        self.hosts.iter().filter(|h| h.is_up()).count()
    }
}
