//! Outbound (Driven) ports for the Outbox subsystem.
//!
//! The queue reports through an injected sink rather than process-wide
//! metric singletons.

/// Metrics sink interface.
///
/// Both calls are fire-and-forget. An implementation that fails to record
/// must handle the failure itself; the queue operation that triggered the
/// report always proceeds.
///
/// Implement this trait to integrate with external metrics systems
/// like Prometheus, StatsD, or OpenTelemetry.
pub trait MetricsSink: Send + Sync {
    /// Sets the current value of a gauge.
    fn observe_gauge(&self, name: &str, value: i64);

    /// Adds `delta` to a monotonically increasing counter.
    fn increment_counter(&self, name: &str, delta: u64);
}
