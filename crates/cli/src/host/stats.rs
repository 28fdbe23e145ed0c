//! Host run statistics.

use std::time::Duration;

use observability::RouterMetricsAggregator;

/// Statistics from a host run
#[derive(Debug, Clone, Default)]
pub struct HostStats {
    /// Records submitted by producers
    pub records_produced: u64,

    /// Producers that ran to completion
    pub producers_finished: usize,

    /// Total duration of the run
    pub duration: Duration,

    /// Targets registered when the run started
    pub active_targets: usize,

    /// Router metrics aggregator
    pub router_metrics: RouterMetricsAggregator,
}

impl HostStats {
    /// Records submitted per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_produced as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of submitted records dropped by the severity filter, in percent
    pub fn filter_rate(&self) -> f64 {
        let totals = self.router_metrics.summary().totals;
        let seen = totals.submitted + totals.filtered;
        if seen > 0 {
            (totals.filtered as f64 / seen as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Host Statistics ===\n");
        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Records produced: {}", self.records_produced);
        println!("   ├─ Throughput: {:.2}/s", self.throughput());
        println!("   ├─ Producers finished: {}", self.producers_finished);
        println!("   └─ Active targets: {}", self.active_targets);

        println!();
        print!("{}", self.router_metrics.summary());
        println!("Filter rate: {:.2}%", self.filter_rate());
        println!();
    }
}
