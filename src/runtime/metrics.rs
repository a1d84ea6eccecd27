//! Runtime guard metrics.
//!
//! Tracks how often the embedded runtime is acquired, how often callers had
//! to wait for it, and how its calls turn out.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters owned by a single `RuntimeGuard`.
#[derive(Debug, Default)]
pub struct GuardMetrics {
    /// Number of tokens handed out
    acquisitions: AtomicUsize,

    /// Number of tokens returned
    releases: AtomicUsize,

    /// Acquisitions that had to wait for another holder
    contended: AtomicUsize,

    /// Bounded waits that expired
    timeouts: AtomicUsize,

    /// Calls made into the runtime's entry point
    runtime_calls: AtomicUsize,

    /// Runtime calls that returned a fault
    runtime_faults: AtomicUsize,
}

impl GuardMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_acquisition(&self, contended: bool) {
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        if contended {
            self.contended.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_call(&self, faulted: bool) {
        self.runtime_calls.fetch_add(1, Ordering::Relaxed);
        if faulted {
            self.runtime_faults.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::Relaxed)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }

    pub fn contended(&self) -> usize {
        self.contended.load(Ordering::Relaxed)
    }

    pub fn timeouts(&self) -> usize {
        self.timeouts.load(Ordering::Relaxed)
    }

    pub fn runtime_calls(&self) -> usize {
        self.runtime_calls.load(Ordering::Relaxed)
    }

    pub fn runtime_faults(&self) -> usize {
        self.runtime_faults.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> GuardMetricsReport {
        let acquisitions = self.acquisitions();
        let contended = self.contended();
        let contention_rate = if acquisitions > 0 {
            (contended as f64 / acquisitions as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.runtime_calls();
        let faults = self.runtime_faults();
        let call_success_rate = if calls > 0 {
            ((calls - faults) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        GuardMetricsReport {
            acquisitions,
            releases: self.releases(),
            contended,
            contention_rate,
            timeouts: self.timeouts(),
            runtime_calls: calls,
            runtime_faults: faults,
            call_success_rate,
        }
    }
}

/// Snapshot of a guard's counters.
#[derive(Debug, Clone, Serialize)]
pub struct GuardMetricsReport {
    pub acquisitions: usize,
    pub releases: usize,
    pub contended: usize,

    /// Contended acquisitions as a percentage (0-100)
    pub contention_rate: f64,

    pub timeouts: usize,
    pub runtime_calls: usize,
    pub runtime_faults: usize,

    /// Successful runtime calls as a percentage (0-100)
    pub call_success_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = GuardMetrics::new();
        assert_eq!(metrics.acquisitions(), 0);
        assert_eq!(metrics.releases(), 0);
        assert_eq!(metrics.timeouts(), 0);
        assert_eq!(metrics.runtime_calls(), 0);
    }

    #[test]
    fn test_record_acquisition() {
        let metrics = GuardMetrics::new();
        metrics.record_acquisition(false);
        metrics.record_acquisition(true);
        assert_eq!(metrics.acquisitions(), 2);
        assert_eq!(metrics.contended(), 1);
    }

    #[test]
    fn test_record_call() {
        let metrics = GuardMetrics::new();
        metrics.record_call(false);
        metrics.record_call(true);
        metrics.record_call(false);
        assert_eq!(metrics.runtime_calls(), 3);
        assert_eq!(metrics.runtime_faults(), 1);
    }

    #[test]
    fn test_report_empty() {
        let report = GuardMetrics::new().report();
        assert_eq!(report.acquisitions, 0);
        assert_eq!(report.contention_rate, 0.0);
        assert_eq!(report.call_success_rate, 0.0);
    }

    #[test]
    fn test_report_rates() {
        let metrics = GuardMetrics::new();
        for contended in [false, true, false, true] {
            metrics.record_acquisition(contended);
            metrics.record_release();
        }
        for faulted in [false, false, false, true] {
            metrics.record_call(faulted);
        }
        metrics.record_timeout();

        let report = metrics.report();
        assert_eq!(report.acquisitions, 4);
        assert_eq!(report.releases, 4);
        assert_eq!(report.contention_rate, 50.0);
        assert_eq!(report.call_success_rate, 75.0);
        assert_eq!(report.timeouts, 1);
    }

    #[test]
    fn test_report_serializes() {
        let metrics = GuardMetrics::new();
        metrics.record_acquisition(false);
        let json = serde_json::to_value(metrics.report()).unwrap();
        assert_eq!(json["acquisitions"], 1);
        assert!(json.get("call_success_rate").is_some());
    }
}
