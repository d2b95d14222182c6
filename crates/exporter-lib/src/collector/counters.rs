//! Process-wide scrape counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic scrape and failure counts
#[derive(Debug, Default)]
pub struct CumulativeCounters {
    total_scrapes: AtomicU64,
    scrape_failures: AtomicU64,
}

impl CumulativeCounters {
    pub fn record_scrape(&self) {
        self.total_scrapes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.scrape_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_scrapes(&self) -> u64 {
        self.total_scrapes.load(Ordering::Relaxed)
    }

    pub fn scrape_failures(&self) -> u64 {
        self.scrape_failures.load(Ordering::Relaxed)
    }
}
