//! Adapters layer for the Outbox subsystem.
//!
//! Implementations of the `MetricsSink` outbound port:
//! - `NoOpMetrics`: discards everything
//! - `InMemoryMetrics`: keeps values in process for polling and tests
//! - `PrometheusMetrics`: exports through a `prometheus::Registry`

pub mod metrics;
pub mod prometheus_sink;

pub use self::metrics::{InMemoryMetrics, MetricsSnapshot, NoOpMetrics};
pub use self::prometheus_sink::PrometheusMetrics;
