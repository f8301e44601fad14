//! In-memory latency histogram for scan instrumentation.
//! Records the wall time of each rescan, from queue pickup to completion.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

/// Shared scan-latency stats. The engine records, the API reads.
/// Values stored in microseconds.
pub struct LatencyStats {
    inner: Mutex<hdrhistogram::Histogram<u64>>,
}

#[derive(Debug, Serialize)]
pub struct LatencySnapshot {
    pub samples: u64,
    pub p50_us: Option<u64>,
    pub p95_us: Option<u64>,
    pub p99_us: Option<u64>,
}

impl LatencyStats {
    /// Tracks 1us to 100s at 3 significant figures.
    pub fn new() -> Self {
        let histogram = hdrhistogram::Histogram::new_with_bounds(1, 100_000_000, 3)
            .expect("valid histogram bounds");
        Self {
            inner: Mutex::new(histogram),
        }
    }

    pub fn record(&self, elapsed: Duration) {
        let us = elapsed.as_micros().min(u128::from(u64::MAX)) as u64;
        if let Ok(mut histogram) = self.inner.lock() {
            let _ = histogram.record(us.max(1));
        }
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        let Ok(histogram) = self.inner.lock() else {
            return LatencySnapshot {
                samples: 0,
                p50_us: None,
                p95_us: None,
                p99_us: None,
            };
        };
        if histogram.len() == 0 {
            return LatencySnapshot {
                samples: 0,
                p50_us: None,
                p95_us: None,
                p99_us: None,
            };
        }
        LatencySnapshot {
            samples: histogram.len(),
            p50_us: Some(histogram.value_at_quantile(0.5)),
            p95_us: Some(histogram.value_at_quantile(0.95)),
            p99_us: Some(histogram.value_at_quantile(0.99)),
        }
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_percentiles() {
        let stats = LatencyStats::new();
        let snap = stats.snapshot();
        assert_eq!(snap.samples, 0);
        assert!(snap.p50_us.is_none());
    }

    #[test]
    fn records_show_up_in_percentiles() {
        let stats = LatencyStats::new();
        for us in [100u64, 200, 300] {
            stats.record(Duration::from_micros(us));
        }
        let snap = stats.snapshot();
        assert_eq!(snap.samples, 3);
        let p50 = snap.p50_us.expect("p50 present");
        assert!((100..=300).contains(&p50), "p50={p50}");
    }
}
