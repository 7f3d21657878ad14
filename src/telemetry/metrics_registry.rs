use lazy_static::lazy_static;
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Meter},
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

// Struct to hold all metrics
#[derive(Clone)]
pub struct RelayMetrics {
    #[allow(dead_code)]
    meter: Meter,
    pub dispatch_requests: Counter<u64>,
    pub dispatch_failures: Counter<u64>,
    pub target_outcomes: Counter<u64>,
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayMetrics {
    pub fn new() -> Self {
        info!("Initializing relay metrics registry");
        let meter = global::meter("fcm_relay");

        let prefix = "fcm_relay_";

        let dispatch_requests = meter
            .u64_counter(format!("{}dispatch_requests", prefix))
            .with_description("Dispatch requests received, by operation")
            .build();

        let dispatch_failures = meter
            .u64_counter(format!("{}dispatch_failures", prefix))
            .with_description("Dispatch requests answered with a failure envelope, by operation")
            .build();

        let target_outcomes = meter
            .u64_counter(format!("{}target_outcomes", prefix))
            .with_description("Per-device outcomes of batch operations")
            .build();

        RelayMetrics {
            meter,
            dispatch_requests,
            dispatch_failures,
            target_outcomes,
        }
    }

    pub fn record_request(&self, operation: &'static str) {
        self.dispatch_requests
            .add(1, &[KeyValue::new("operation", operation)]);
    }

    pub fn record_failure(&self, operation: &'static str) {
        self.dispatch_failures
            .add(1, &[KeyValue::new("operation", operation)]);
    }

    /// Records the per-device outcome counts of a multicast or topic membership change.
    pub fn record_target_outcomes(
        &self,
        operation: &'static str,
        success_count: usize,
        failure_count: usize,
    ) {
        self.target_outcomes.add(
            success_count as u64,
            &[
                KeyValue::new("operation", operation),
                KeyValue::new("outcome", "success"),
            ],
        );
        self.target_outcomes.add(
            failure_count as u64,
            &[
                KeyValue::new("operation", operation),
                KeyValue::new("outcome", "failure"),
            ],
        );
    }
}

// Global instance of RelayMetrics
lazy_static! {
    static ref METRICS: RwLock<Option<Arc<RelayMetrics>>> = RwLock::new(None);
}

// Initialize the global metrics instance
pub fn init_metrics_registry() {
    let mut metrics = METRICS.write();
    if metrics.is_none() {
        *metrics = Some(Arc::new(RelayMetrics::new()));
        info!("Relay metrics registry initialized");
    }
}

// Get a reference to the metrics registry
pub fn get_metrics() -> Option<Arc<RelayMetrics>> {
    METRICS.read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_are_available_to_concurrent_readers() {
        init_metrics_registry();

        let readers: Vec<_> = (0..16)
            .map(|_| {
                thread::spawn(|| (0..1000).all(|_| get_metrics().is_some()))
            })
            .collect();

        for reader in readers {
            assert!(reader.join().unwrap());
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        init_metrics_registry();
        let first = get_metrics().unwrap();
        init_metrics_registry();

        assert!(Arc::ptr_eq(&first, &get_metrics().unwrap()));
    }
}
