//! In-process metrics sinks
//!
//! ## Usage
//!
//! ```ignore
//! use qc_outbox::{InMemoryMetrics, MessageQueue};
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(InMemoryMetrics::new());
//! let outbox = MessageQueue::new(metrics.clone());
//!
//! outbox.enqueue(msg, height)?;
//! assert_eq!(metrics.gauge("message_queue_size"), Some(1));
//! ```

use crate::ports::MetricsSink;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// No-op metrics sink for when metrics are disabled
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMetrics;

impl MetricsSink for NoOpMetrics {
    fn observe_gauge(&self, _: &str, _: i64) {}
    fn increment_counter(&self, _: &str, _: u64) {}
}

/// Metrics collector keeping the latest gauge values and counter totals.
///
/// Thread-safe. Useful for tests and for hosts that poll values themselves.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    gauges: Mutex<HashMap<String, i64>>,
    counters: Mutex<HashMap<String, u64>>,
    observations: AtomicU64,
}

impl InMemoryMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value observed for a gauge
    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.lock().get(name).copied()
    }

    /// Accumulated value of a counter (0 if never incremented)
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.lock().get(name).copied().unwrap_or(0)
    }

    /// Number of gauge observations recorded since creation or reset
    pub fn gauge_observations(&self) -> u64 {
        self.observations.load(Ordering::Relaxed)
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            gauges: self.gauges.lock().clone(),
            counters: self.counters.lock().clone(),
            gauge_observations: self.gauge_observations(),
        }
    }

    /// Reset all values
    pub fn reset(&self) {
        self.gauges.lock().clear();
        self.counters.lock().clear();
        self.observations.store(0, Ordering::Relaxed);
    }
}

impl MetricsSink for InMemoryMetrics {
    fn observe_gauge(&self, name: &str, value: i64) {
        self.gauges.lock().insert(name.to_string(), value);
        self.observations.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_counter(&self, name: &str, delta: u64) {
        let mut counters = self.counters.lock();
        let total = counters.entry(name.to_string()).or_insert(0);
        *total = total.saturating_add(delta);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Last value per gauge
    pub gauges: HashMap<String, i64>,
    /// Total per counter
    pub counters: HashMap<String, u64>,
    /// Gauge observations recorded
    pub gauge_observations: u64,
}
