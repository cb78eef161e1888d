//! Metrics sink abstraction.
//!
//! The delivery client never looks counters up by name at call time. It asks
//! the injected [`MetricsSink`] for its handles once, at construction, and only
//! ever increments them afterwards.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Counter incremented once per SMS delivery attempt.
pub const SMS_DELIVERED: &str = "sms.delivered";
/// Counter incremented once per voice delivery attempt.
pub const VOX_DELIVERED: &str = "vox.delivered";
/// Counter accumulating delivery prices in thousandths of the currency unit.
pub const PRICE: &str = "price";

/// A write-only counter.
pub trait CounterHandle: Send + Sync + Debug {
    /// Add `value` to the counter.
    fn add(&self, value: u64);
}

/// Source of named counters.
pub trait MetricsSink: Send + Sync {
    /// Return the counter registered under `name`, creating it if needed.
    fn counter(&self, name: &'static str) -> Arc<dyn CounterHandle>;
}

// =============================================================================
// NoopMetrics
// =============================================================================

/// Sink that discards every measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

#[derive(Debug)]
struct NoopCounter;

impl CounterHandle for NoopCounter {
    fn add(&self, _value: u64) {}
}

impl MetricsSink for NoopMetrics {
    fn counter(&self, _name: &'static str) -> Arc<dyn CounterHandle> {
        Arc::new(NoopCounter)
    }
}

// =============================================================================
// InMemoryMetrics
// =============================================================================

/// Sink backed by process-local atomic counters.
///
/// Clones share the same counters, so a host can keep one clone for
/// diagnostics and hand another to the client.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetrics {
    counters: Arc<Mutex<HashMap<&'static str, Arc<AtomicCounter>>>>,
}

#[derive(Debug, Default)]
struct AtomicCounter(AtomicU64);

impl CounterHandle for AtomicCounter {
    fn add(&self, value: u64) {
        self.0.fetch_add(value, Ordering::Relaxed);
    }
}

impl InMemoryMetrics {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of the counter named `name`, or 0 if it was never registered.
    pub fn value(&self, name: &str) -> u64 {
        let counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        counters
            .get(name)
            .map(|c| c.0.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl MetricsSink for InMemoryMetrics {
    fn counter(&self, name: &'static str) -> Arc<dyn CounterHandle> {
        let mut counters = match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let counter = counters.entry(name).or_default();
        Arc::clone(&*counter) as Arc<dyn CounterHandle>
    }
}

// =============================================================================
// OtelMetrics
// =============================================================================

#[cfg(feature = "metrics")]
pub use otel::OtelMetrics;

#[cfg(feature = "metrics")]
mod otel {
    use super::{CounterHandle, MetricsSink};
    use opentelemetry::metrics::{Counter, Meter};
    use std::fmt::{self, Debug, Formatter};
    use std::sync::Arc;

    /// Sink that records into OpenTelemetry `u64` counters.
    #[derive(Clone)]
    pub struct OtelMetrics {
        meter: Meter,
    }

    impl OtelMetrics {
        /// Use the given meter.
        pub fn new(meter: Meter) -> Self {
            Self { meter }
        }

        /// Use the globally registered meter provider, scoped by `name`.
        pub fn global(name: &'static str) -> Self {
            Self::new(opentelemetry::global::meter(name))
        }
    }

    impl Debug for OtelMetrics {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.debug_struct("OtelMetrics").finish_non_exhaustive()
        }
    }

    struct OtelCounter(Counter<u64>);

    impl Debug for OtelCounter {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str("OtelCounter")
        }
    }

    impl CounterHandle for OtelCounter {
        fn add(&self, value: u64) {
            self.0.add(value, &[]);
        }
    }

    impl MetricsSink for OtelMetrics {
        fn counter(&self, name: &'static str) -> Arc<dyn CounterHandle> {
            Arc::new(OtelCounter(self.meter.u64_counter(name).build()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::metrics::{PRICE, SMS_DELIVERED};

        #[test]
        fn test_global_meter_counters_accept_values() {
            // No provider is installed, so the global meter is a no-op.
            let metrics = OtelMetrics::global("own_sms_sender_test");
            metrics.counter(SMS_DELIVERED).add(1);
            metrics.counter(PRICE).add(50);
            assert!(format!("{:?}", metrics).starts_with("OtelMetrics"));
        }
    }
}
