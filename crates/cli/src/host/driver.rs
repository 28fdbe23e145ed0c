//! Host driver: spawns producers and ticks the router.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use contracts::Severity;
use observability::{record_target_count, RouterMetricsAggregator};
use router::{Router, TracingTarget};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::stats::HostStats;

/// Target registered when the configuration names none
const CONSOLE_TARGET: &str = "console";

/// Host loop settings
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Concurrent producer tasks
    pub producers: usize,
    /// Records each producer submits
    pub messages_per_producer: u64,
    /// Interval between drains
    pub tick: Duration,
    /// Stop after this many ticks, even with work outstanding
    pub max_ticks: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            producers: 4,
            messages_per_producer: 100,
            tick: Duration::from_millis(16),
            max_ticks: None,
        }
    }
}

/// Owns a router handle and drives it like an application's update loop
pub struct Host {
    router: Router,
    config: HostConfig,
}

impl Host {
    pub fn new(router: Router, config: HostConfig) -> Self {
        Self { router, config }
    }

    /// Run producers to completion and drain until nothing is pending.
    ///
    /// Tears the router down before returning.
    #[instrument(
        name = "host_run",
        skip(self),
        fields(producers = self.config.producers, deferred = self.router.is_deferred())
    )]
    pub async fn run(self) -> Result<HostStats> {
        let start = Instant::now();

        if self.router.target_ids().is_empty() {
            info!(target_id = CONSOLE_TARGET, "no targets configured, using console");
            self.router.register_target(Arc::new(TracingTarget::new(
                CONSOLE_TARGET,
                true,
                false,
            )));
        }
        let active_targets = self.router.target_ids().len();
        record_target_count(active_targets);

        let mut producers = JoinSet::new();
        for producer in 0..self.config.producers {
            let router = self.router.clone();
            let messages = self.config.messages_per_producer;
            producers.spawn(produce(router, producer, messages));
        }

        let mut stats = HostStats {
            active_targets,
            router_metrics: RouterMetricsAggregator::new(),
            ..Default::default()
        };

        let mut interval = tokio::time::interval(self.config.tick);
        let mut ticks = 0u64;
        loop {
            interval.tick().await;
            ticks += 1;

            let drained = self.router.drain();
            stats.router_metrics.update(self.router.metrics().snapshot());
            if drained > 0 {
                debug!(tick = ticks, drained, "tick");
            }

            while let Some(joined) = producers.try_join_next() {
                match joined {
                    Ok(produced) => {
                        stats.records_produced += produced;
                        stats.producers_finished += 1;
                    }
                    Err(e) => warn!(error = %e, "producer task failed"),
                }
            }

            if producers.is_empty() && self.router.pending_len() == 0 {
                break;
            }
            if self.config.max_ticks.is_some_and(|max| ticks >= max) {
                warn!(
                    ticks,
                    pending = self.router.pending_len(),
                    "tick limit reached, stopping"
                );
                producers.abort_all();
                break;
            }
        }

        self.router.shutdown();
        stats.router_metrics.update(self.router.metrics().snapshot());
        record_target_count(self.router.target_ids().len());
        stats.duration = start.elapsed();

        info!(
            records = stats.records_produced,
            ticks,
            duration_ms = stats.duration.as_millis() as u64,
            "host finished"
        );
        Ok(stats)
    }
}

/// Submit `messages` records, cycling through every severity
async fn produce(router: Router, producer: usize, messages: u64) -> u64 {
    let category = format!("producer-{producer}");
    for n in 0..messages {
        let severity = Severity::ALL[n as usize % Severity::ALL.len()];
        router.log(severity, &category, &format!("message {n} from producer {producer}"));
        tokio::task::yield_now().await;
    }
    messages
}
