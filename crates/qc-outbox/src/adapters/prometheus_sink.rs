//! Prometheus metrics sink.
//!
//! Each metric name reported by the queue becomes an `IntGauge` or
//! `IntCounter` registered on first use. Names follow the convention
//! `<namespace>_<name>`, e.g. `qc_outbox_message_queue_size`.

use crate::domain::{OutboxConfig, OutboxError, OutboxResult};
use crate::ports::MetricsSink;
use parking_lot::Mutex;
use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use std::collections::HashMap;
use tracing::warn;

/// Metrics sink backed by a Prometheus registry.
///
/// A metric that cannot be created or registered is logged once and then
/// ignored; the reporting call still returns normally.
pub struct PrometheusMetrics {
    registry: Registry,
    namespace: String,
    gauges: Mutex<HashMap<String, Option<IntGauge>>>,
    counters: Mutex<HashMap<String, Option<IntCounter>>>,
}

impl PrometheusMetrics {
    /// Create a sink with its own registry.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_registry(Registry::new(), namespace)
    }

    /// Create a sink that registers into an existing registry.
    pub fn with_registry(registry: Registry, namespace: impl Into<String>) -> Self {
        Self {
            registry,
            namespace: namespace.into(),
            gauges: Mutex::new(HashMap::new()),
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Create a sink using the namespace from configuration.
    pub fn from_config(config: &OutboxConfig) -> Self {
        Self::new(config.metrics_namespace.clone())
    }

    /// The registry metrics are registered into.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode all registered metrics in the Prometheus text format.
    pub fn gather_text(&self) -> OutboxResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| OutboxError::MetricsExport(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| OutboxError::MetricsExport(e.to_string()))
    }

    fn opts(&self, name: &str, help: &str) -> Opts {
        let opts = Opts::new(name, help);
        if self.namespace.is_empty() {
            opts
        } else {
            opts.namespace(self.namespace.clone())
        }
    }

    fn make_gauge(&self, name: &str) -> Option<IntGauge> {
        let gauge = IntGauge::with_opts(self.opts(name, "Outbox queue size"))
            .map_err(|e| warn!("[qc-outbox] Cannot create gauge {}: {}", name, e))
            .ok()?;
        if let Err(e) = self.registry.register(Box::new(gauge.clone())) {
            warn!("[qc-outbox] Cannot register gauge {}: {}", name, e);
        }
        Some(gauge)
    }

    fn make_counter(&self, name: &str) -> Option<IntCounter> {
        let counter = IntCounter::with_opts(self.opts(name, "Outbox messages expired"))
            .map_err(|e| warn!("[qc-outbox] Cannot create counter {}: {}", name, e))
            .ok()?;
        if let Err(e) = self.registry.register(Box::new(counter.clone())) {
            warn!("[qc-outbox] Cannot register counter {}: {}", name, e);
        }
        Some(counter)
    }
}

impl MetricsSink for PrometheusMetrics {
    fn observe_gauge(&self, name: &str, value: i64) {
        let mut gauges = self.gauges.lock();
        let gauge = match gauges.get(name) {
            Some(existing) => existing.clone(),
            None => {
                let created = self.make_gauge(name);
                gauges.insert(name.to_string(), created.clone());
                created
            }
        };
        if let Some(gauge) = gauge {
            gauge.set(value);
        }
    }

    fn increment_counter(&self, name: &str, delta: u64) {
        let mut counters = self.counters.lock();
        let counter = match counters.get(name) {
            Some(existing) => existing.clone(),
            None => {
                let created = self.make_counter(name);
                counters.insert(name.to_string(), created.clone());
                created
            }
        };
        if let Some(counter) = counter {
            counter.inc_by(delta);
        }
    }
}
