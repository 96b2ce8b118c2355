//! Endpoint counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one endpoint
#[derive(Debug, Default)]
pub struct EndpointMetrics {
    /// Messages handed to the transport
    published: AtomicU64,
    /// Messages received
    received: AtomicU64,
    /// Messages skipped by lagging subscribers
    lagged: AtomicU64,
    /// Subscriber connections accepted
    accepted: AtomicU64,
}

impl EndpointMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn inc_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lagged(&self) -> u64 {
        self.lagged.load(Ordering::Relaxed)
    }

    pub fn add_lagged(&self, missed: u64) {
        self.lagged.fetch_add(missed, Ordering::Relaxed);
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn inc_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            published: self.published(),
            received: self.received(),
            lagged: self.lagged(),
            accepted: self.accepted(),
        }
    }
}

/// Snapshot of endpoint metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub published: u64,
    pub received: u64,
    pub lagged: u64,
    pub accepted: u64,
}
