//! Shared health state for the /health endpoint.
//! Updated by the bridge server and the scan engine.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/// Shared liveness metrics. Components record, the API reads.
#[derive(Default)]
pub struct HealthState {
    /// True while a bridge connection is being served.
    pub bridge_connected: AtomicBool,
    /// Millisecond timestamp of the last completed scan (0 = none yet).
    pub last_scan_at_ms: AtomicI64,
    /// Scans completed since process start.
    pub scans_completed: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bridge_connected(&self, connected: bool) {
        self.bridge_connected.store(connected, Ordering::Relaxed);
    }

    pub fn mark_scan(&self, at_ms: i64) {
        self.last_scan_at_ms.store(at_ms, Ordering::Relaxed);
        self.scans_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bridge_connected(&self) -> bool {
        self.bridge_connected.load(Ordering::Relaxed)
    }

    pub fn last_scan_at_ms(&self) -> i64 {
        self.last_scan_at_ms.load(Ordering::Relaxed)
    }

    pub fn scans_completed(&self) -> u64 {
        self.scans_completed.load(Ordering::Relaxed)
    }
}
