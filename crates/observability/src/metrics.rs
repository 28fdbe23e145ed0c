//! Router metrics export
//!
//! Publishes `RouterMetricsSnapshot` through the `metrics` facade and keeps
//! per-tick deltas for summaries.

use metrics::{counter, gauge, histogram};
use router::RouterMetricsSnapshot;

/// Export the difference between two snapshots
///
/// Call once per host tick with the previous and current snapshot.
///
/// # Example
///
/// ```ignore
/// let now = router.metrics().snapshot();
/// record_router_metrics(&last, &now);
/// last = now;
/// ```
pub fn record_router_metrics(prev: &RouterMetricsSnapshot, now: &RouterMetricsSnapshot) {
    counter!("log_router_submitted_total").increment(now.submitted.saturating_sub(prev.submitted));
    counter!("log_router_filtered_total").increment(now.filtered.saturating_sub(prev.filtered));
    counter!("log_router_delivered_total").increment(now.delivered.saturating_sub(prev.delivered));
    counter!("log_router_target_failures_total")
        .increment(now.failures.saturating_sub(prev.failures));
    counter!("log_router_targets_evicted_total").increment(now.evicted.saturating_sub(prev.evicted));

    let drained = now.drained.saturating_sub(prev.drained);
    counter!("log_router_drained_total").increment(drained);
    histogram!("log_router_drain_batch").record(drained as f64);

    gauge!("log_router_pending_entries").set(now.pending as f64);
}

/// Record a target being registered or removed
pub fn record_target_count(count: usize) {
    gauge!("log_router_registered_targets").set(count as f64);
}

/// Running totals kept in memory, for end-of-run summaries
#[derive(Debug, Clone, Default)]
pub struct RouterMetricsAggregator {
    /// Ticks observed
    pub ticks: u64,
    /// Largest pending queue seen at a tick
    pub max_pending: usize,
    /// Last snapshot observed
    pub last: RouterMetricsSnapshot,
}

impl RouterMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a snapshot, exporting the delta since the previous one
    pub fn update(&mut self, now: RouterMetricsSnapshot) {
        record_router_metrics(&self.last, &now);
        self.ticks += 1;
        self.max_pending = self.max_pending.max(now.pending);
        self.last = now;
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            ticks: self.ticks,
            max_pending: self.max_pending,
            totals: self.last,
        }
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub ticks: u64,
    pub max_pending: usize,
    pub totals: RouterMetricsSnapshot,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Router Metrics Summary ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Submitted: {}", self.totals.submitted)?;
        writeln!(f, "Filtered: {}", self.totals.filtered)?;
        writeln!(f, "Delivered: {}", self.totals.delivered)?;
        writeln!(
            f,
            "Target failures: {} (evicted {})",
            self.totals.failures, self.totals.evicted
        )?;
        writeln!(f, "Drained entries: {}", self.totals.drained)?;
        writeln!(f, "Max pending: {}", self.max_pending)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = RouterMetricsAggregator::new();
        aggregator.update(RouterMetricsSnapshot {
            submitted: 4,
            pending: 3,
            ..Default::default()
        });
        aggregator.update(RouterMetricsSnapshot {
            submitted: 6,
            drained: 5,
            pending: 1,
            ..Default::default()
        });

        let summary = aggregator.summary();
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.max_pending, 3);
        assert_eq!(summary.totals.submitted, 6);
    }

    #[test]
    fn test_summary_display() {
        let summary = MetricsSummary {
            ticks: 10,
            max_pending: 4,
            totals: RouterMetricsSnapshot {
                submitted: 100,
                failures: 1,
                evicted: 1,
                ..Default::default()
            },
        };

        let output = format!("{}", summary);
        assert!(output.contains("Submitted: 100"));
        assert!(output.contains("Target failures: 1 (evicted 1)"));
    }
}
