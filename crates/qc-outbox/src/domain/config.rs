//! Outbox configuration and validation
//!
//! Only metric naming is configurable: queue semantics have no knobs.
//!
//! # Example
//!
//! ```ignore
//! use qc_outbox::domain::OutboxConfig;
//!
//! let config = OutboxConfig::default()
//!     .with_metrics_namespace("node_a")
//!     .with_size_gauge_name("pending_outbound");
//! config.validate()?;
//! ```

use super::errors::{OutboxError, OutboxResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Default gauge reporting a sender's queue length after each mutation.
pub const DEFAULT_SIZE_GAUGE: &str = "message_queue_size";

/// Default counter accumulating expired messages.
pub const DEFAULT_EXPIRE_COUNTER: &str = "message_queue_expire";

/// Default Prometheus namespace.
pub const DEFAULT_METRICS_NAMESPACE: &str = "qc_outbox";

/// Outbox configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboxConfig {
    /// Gauge name for queue size observations
    pub size_gauge_name: String,
    /// Counter name for expired message counts
    pub expire_counter_name: String,
    /// Prefix applied by the Prometheus adapter
    pub metrics_namespace: String,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            size_gauge_name: DEFAULT_SIZE_GAUGE.to_string(),
            expire_counter_name: DEFAULT_EXPIRE_COUNTER.to_string(),
            metrics_namespace: DEFAULT_METRICS_NAMESPACE.to_string(),
        }
    }
}

impl OutboxConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_OUTBOX_SIZE_GAUGE`: Size gauge name (default: message_queue_size)
    /// - `QC_OUTBOX_EXPIRE_COUNTER`: Expiry counter name (default: message_queue_expire)
    /// - `QC_OUTBOX_METRICS_NAMESPACE`: Prometheus namespace (default: qc_outbox)
    pub fn from_env() -> Self {
        Self {
            size_gauge_name: env::var("QC_OUTBOX_SIZE_GAUGE")
                .unwrap_or_else(|_| DEFAULT_SIZE_GAUGE.to_string()),

            expire_counter_name: env::var("QC_OUTBOX_EXPIRE_COUNTER")
                .unwrap_or_else(|_| DEFAULT_EXPIRE_COUNTER.to_string()),

            metrics_namespace: env::var("QC_OUTBOX_METRICS_NAMESPACE")
                .unwrap_or_else(|_| DEFAULT_METRICS_NAMESPACE.to_string()),
        }
    }

    /// Validate metric names.
    ///
    /// Names must be non-empty and match `[a-zA-Z_][a-zA-Z0-9_]*` so every
    /// metrics backend accepts them. The namespace may be empty.
    pub fn validate(&self) -> OutboxResult<()> {
        for (field, value) in [
            ("size_gauge_name", &self.size_gauge_name),
            ("expire_counter_name", &self.expire_counter_name),
        ] {
            if value.is_empty() {
                return Err(OutboxError::InvalidConfig(format!("{} cannot be empty", field)));
            }
            if !is_metric_identifier(value) {
                return Err(OutboxError::InvalidConfig(format!(
                    "{} '{}' is not a valid metric name",
                    field, value
                )));
            }
        }

        if !self.metrics_namespace.is_empty() && !is_metric_identifier(&self.metrics_namespace) {
            return Err(OutboxError::InvalidConfig(format!(
                "metrics_namespace '{}' is not a valid metric name",
                self.metrics_namespace
            )));
        }

        if self.size_gauge_name == self.expire_counter_name {
            return Err(OutboxError::InvalidConfig(
                "size gauge and expiry counter must have different names".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style method to set the size gauge name
    pub fn with_size_gauge_name(mut self, name: impl Into<String>) -> Self {
        self.size_gauge_name = name.into();
        self
    }

    /// Builder-style method to set the expiry counter name
    pub fn with_expire_counter_name(mut self, name: impl Into<String>) -> Self {
        self.expire_counter_name = name.into();
        self
    }

    /// Builder-style method to set the metrics namespace
    pub fn with_metrics_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metrics_namespace = namespace.into();
        self
    }
}

fn is_metric_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OutboxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.size_gauge_name, "message_queue_size");
        assert_eq!(config.expire_counter_name, "message_queue_expire");
    }

    #[test]
    fn test_config_rejects_empty_name() {
        let config = OutboxConfig::default().with_size_gauge_name("");
        assert!(matches!(
            config.validate(),
            Err(OutboxError::InvalidConfig(msg)) if msg.contains("size_gauge_name")
        ));
    }

    #[test]
    fn test_config_rejects_bad_identifier() {
        let config = OutboxConfig::default().with_expire_counter_name("expire-count");
        assert!(matches!(config.validate(), Err(OutboxError::InvalidConfig(_))));

        let config = OutboxConfig::default().with_metrics_namespace("9lives");
        assert!(matches!(config.validate(), Err(OutboxError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_allows_empty_namespace() {
        let config = OutboxConfig::default().with_metrics_namespace("");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_name_collision() {
        let config = OutboxConfig::default()
            .with_size_gauge_name("outbox")
            .with_expire_counter_name("outbox");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde_fills_defaults() {
        let config: OutboxConfig =
            serde_json::from_str(r#"{"metrics_namespace":"node_a"}"#).unwrap();
        assert_eq!(config.metrics_namespace, "node_a");
        assert_eq!(config.size_gauge_name, DEFAULT_SIZE_GAUGE);

        let json = serde_json::to_string(&config).unwrap();
        let back: OutboxConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
