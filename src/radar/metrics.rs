//! Runtime counters for the radar pipeline.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide pipeline counters.
#[derive(Debug, Default)]
pub struct RadarMetrics {
    mints_scanned: AtomicU64,
    alerts_delivered: AtomicU64,
    alerts_suppressed: AtomicU64,
    delivery_failures: AtomicU64,
    provider_errors: AtomicU64,
}

/// Point-in-time copy of [`RadarMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub mints_scanned: u64,
    pub alerts_delivered: u64,
    pub alerts_suppressed: u64,
    pub delivery_failures: u64,
    pub provider_errors: u64,
}

impl RadarMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_scan(&self) {
        self.mints_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.alerts_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self) {
        self.alerts_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_error(&self) {
        self.provider_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            mints_scanned: self.mints_scanned.load(Ordering::Relaxed),
            alerts_delivered: self.alerts_delivered.load(Ordering::Relaxed),
            alerts_suppressed: self.alerts_suppressed.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            provider_errors: self.provider_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = RadarMetrics::new();
        metrics.record_scan();
        metrics.record_scan();
        metrics.record_delivered();
        metrics.record_provider_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.mints_scanned, 2);
        assert_eq!(snapshot.alerts_delivered, 1);
        assert_eq!(snapshot.alerts_suppressed, 0);
        assert_eq!(snapshot.delivery_failures, 0);
        assert_eq!(snapshot.provider_errors, 1);
    }
}
