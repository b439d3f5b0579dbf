//! Cache Statistics Module
//!
//! Tracks routing outcomes: cache hits and misses, network traffic and writes.

use serde::Serialize;

// == Cache Stats ==
/// Counters updated by the request router.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Requests answered from the cache
    pub hits: u64,
    /// Cache-first lookups that found nothing
    pub misses: u64,
    /// Network attempts made by the router
    pub network_fetches: u64,
    /// Network attempts that produced no response
    pub network_failures: u64,
    /// Successful cache write-backs
    pub cache_writes: u64,
    /// Write-backs that failed and were skipped
    pub write_failures: u64,
    /// Offline document or 408 placeholder served
    pub offline_fallbacks: u64,
    /// Requests not intercepted
    pub passthroughs: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Fetch ==
    /// Counts a network attempt, and a failure when no response came back.
    pub fn record_fetch(&mut self, succeeded: bool) {
        self.network_fetches += 1;
        if !succeeded {
            self.network_failures += 1;
        }
    }

    // == Record Write ==
    /// Counts a cache write-back by outcome.
    pub fn record_write(&mut self, succeeded: bool) {
        if succeeded {
            self.cache_writes += 1;
        } else {
            self.write_failures += 1;
        }
    }

    // == Record Offline Fallback ==
    /// Increments the offline fallback counter.
    pub fn record_offline_fallback(&mut self) {
        self.offline_fallbacks += 1;
    }

    // == Record Passthrough ==
    /// Increments the passthrough counter.
    pub fn record_passthrough(&mut self) {
        self.passthroughs += 1;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.network_fetches, 0);
        assert_eq!(stats.cache_writes, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_record_fetch_failures() {
        let mut stats = CacheStats::new();
        stats.record_fetch(true);
        stats.record_fetch(false);
        assert_eq!(stats.network_fetches, 2);
        assert_eq!(stats.network_failures, 1);
    }

    #[test]
    fn test_record_write() {
        let mut stats = CacheStats::new();
        stats.record_write(true);
        stats.record_write(false);
        stats.record_write(true);
        assert_eq!(stats.cache_writes, 2);
        assert_eq!(stats.write_failures, 1);
    }
}
