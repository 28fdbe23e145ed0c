//! # Integration Tests
//!
//! Cross-crate tests for the log router.
//!
//! Covers:
//! - Contract sanity checks
//! - Routing properties (filtering, exclusion, fault isolation)
//! - Deferred dispatch ordering and batching
//! - Pool conservation under concurrent producers
//! - Config file to running router

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use contracts::{ContractError, LogRecord, RouterConfig, Target, TargetId};
    use router::{MemoryTarget, Router};

    /// Target that fails every delivery
    pub struct FailingTarget {
        pub id: TargetId,
        pub panic: bool,
    }

    impl Target for FailingTarget {
        fn id(&self) -> TargetId {
            self.id.clone()
        }

        fn log_by_default(&self) -> bool {
            true
        }

        fn include_call_stack(&self) -> bool {
            false
        }

        fn log(&self, _record: &LogRecord) -> Result<(), ContractError> {
            if self.panic {
                panic!("disk on fire");
            }
            Err(ContractError::target_write(self.id.as_str(), "write refused"))
        }
    }

    pub fn router(deferred: bool) -> Router {
        Router::new(&RouterConfig {
            deferred,
            max_call_stack_frames: 0,
            ..RouterConfig::default()
        })
    }

    pub fn memory(router: &Router, id: &str) -> Arc<MemoryTarget> {
        let target = Arc::new(MemoryTarget::new(id));
        assert!(router.register_target(target.clone()));
        target
    }
}

#[cfg(test)]
mod contract_tests {
    use contracts::{RecordKind, Severity};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(RecordKind::default().as_str(), RecordKind::DEFAULT_NAME);
    }

    #[test]
    fn test_severity_total_order() {
        for pair in Severity::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort below {}", pair[0], pair[1]);
        }
        assert_eq!(Severity::ALL[0], Severity::MIN);
        assert_eq!(Severity::ALL[Severity::ALL.len() - 1], Severity::MAX);
    }
}

#[cfg(test)]
mod routing_tests {
    use std::sync::Arc;

    use contracts::{RecordKind, Severity};
    use router::{MemoryTarget, ROUTER_CATEGORY};

    use crate::support::{memory, router, FailingTarget};

    /// For every filter level, exactly the records at or above it get through
    #[test]
    fn test_filter_monotonicity() {
        for filter in Severity::ALL {
            let router = router(false);
            let target = memory(&router, "mem");
            router.set_severity_filter(filter);

            for severity in Severity::ALL {
                router.log(severity, "test", severity.as_str());
            }

            let delivered: Vec<Severity> = target.records().iter().map(|r| r.severity).collect();
            let expected: Vec<Severity> =
                Severity::ALL.into_iter().filter(|s| *s >= filter).collect();
            assert_eq!(delivered, expected, "filter {filter}");
            assert_eq!(
                router.metrics().filtered() as usize,
                Severity::ALL.len() - expected.len()
            );
        }
    }

    #[test]
    fn test_dispatch_excluding() {
        let router = router(false);
        let a = memory(&router, "a");
        let b = memory(&router, "b");
        let c = memory(&router, "c");

        router.dispatch_excluding(router.message(Severity::Info, "test", "not for b"), "b");
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert_eq!(c.len(), 1);

        // Excluding an unknown id excludes nothing
        router.dispatch_excluding(router.message(Severity::Info, "test", "for all"), "x");
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_dispatch_to_unknown_target_is_noop() {
        let router = router(false);
        let a = memory(&router, "a");
        let kind = RecordKind::default();

        let record = router.message(Severity::Info, "test", "nowhere");
        let free = router.pool().free_len(&kind);
        router.dispatch_to(record, "missing");

        assert!(a.is_empty());
        assert_eq!(router.pool().free_len(&kind), free + 1);
    }

    #[test]
    fn test_failing_target_is_isolated() {
        for panic in [false, true] {
            let router = router(false);
            let a = memory(&router, "a");
            let c = memory(&router, "c");
            router.register_target(Arc::new(FailingTarget {
                id: "broken".into(),
                panic,
            }));

            router.log(Severity::Info, "app", "hello");

            assert!(router.get_target("broken").is_none());
            for target in [&a, &c] {
                let records = target.records();
                assert_eq!(records[0].body, "hello");
                let reports: Vec<_> = records
                    .iter()
                    .filter(|r| r.category == ROUTER_CATEGORY)
                    .collect();
                assert_eq!(reports.len(), 1, "panic={panic}");
                assert_eq!(reports[0].severity, Severity::Error);
                assert!(reports[0].body.contains("broken"));
            }
            assert_eq!(router.metrics().evicted(), 1);

            // Later records reach the survivors only
            router.log(Severity::Info, "app", "still here");
            assert_eq!(a.bodies().last().map(String::as_str), Some("still here"));
        }
    }

    #[test]
    fn test_failure_report_is_queued_in_deferred_mode() {
        let router = router(true);
        let a = memory(&router, "a");
        router.register_target(Arc::new(FailingTarget {
            id: "broken".into(),
            panic: false,
        }));

        router.log(Severity::Info, "app", "hello");
        assert_eq!(router.drain(), 1);
        // The failure report was dispatched while deferred, so it waits its turn
        assert_eq!(router.pending_len(), 1);
        assert_eq!(router.drain(), 1);

        let bodies = a.bodies();
        assert_eq!(bodies.len(), 2);
        assert!(bodies[1].contains("broken"));
    }

    #[test]
    fn test_removed_target_receives_nothing_more() {
        let router = router(true);
        let a = memory(&router, "a");
        let gone = memory(&router, "gone");

        router.log(Severity::Info, "app", "queued");
        assert!(router.remove_target("gone"));
        router.drain();

        assert_eq!(a.bodies(), vec!["queued".to_string()]);
        assert!(gone.is_empty());
        assert_eq!(gone.teardown_count(), 1);
    }

    #[test]
    fn test_call_stack_only_for_targets_that_ask() {
        let router = router(false);
        router.set_max_call_stack_frames(8);
        let plain = memory(&router, "plain");
        let traced = Arc::new(MemoryTarget::new("traced").with_call_stack(true));
        router.register_target(traced.clone());

        router.log(Severity::Error, "app", "boom");

        assert!(plain.records()[0].call_stack.is_none());
        let stack = traced.records()[0].call_stack.clone();
        assert!(stack.is_some_and(|s| s.lines().count() <= 9));
    }
}

#[cfg(test)]
mod deferred_tests {
    use contracts::Severity;

    use crate::support::{memory, router};

    #[test]
    fn test_drain_is_fifo() {
        let router = router(true);
        let target = memory(&router, "mem");

        for body in ["E1", "E2", "E3"] {
            router.log(Severity::Info, "test", body);
        }
        assert!(target.is_empty());

        assert_eq!(router.drain(), 3);
        assert_eq!(target.bodies(), vec!["E1", "E2", "E3"]);
    }

    #[test]
    fn test_drain_is_bounded() {
        let router = router(true);
        let target = memory(&router, "mem");

        for n in 0..12 {
            router.log(Severity::Info, "test", &format!("m{n}"));
        }

        assert_eq!(router.drain(), 5);
        assert_eq!(router.pending_len(), 7);
        assert_eq!(router.drain(), 5);
        assert_eq!(router.drain(), 2);
        assert_eq!(router.drain(), 0);
        assert_eq!(target.len(), 12);
        assert_eq!(router.metrics().drained(), 12);
    }

    #[test]
    fn test_drain_in_immediate_mode_is_noop() {
        let router = router(false);
        let target = memory(&router, "mem");
        router.log(Severity::Info, "test", "now");
        assert_eq!(target.len(), 1);
        assert_eq!(router.drain(), 0);
    }

    #[test]
    fn test_disabling_deferred_flushes_queue() {
        let router = router(true);
        let target = memory(&router, "mem");
        router.log(Severity::Info, "test", "a");
        router.log(Severity::Info, "test", "b");

        router.enable_deferred_dispatch(false);

        assert_eq!(router.pending_len(), 0);
        assert_eq!(target.bodies(), vec!["a", "b"]);
        router.log(Severity::Info, "test", "c");
        assert_eq!(target.len(), 3);
    }

    #[test]
    fn test_target_registered_after_dispatch_is_not_included() {
        let router = router(true);
        let early = memory(&router, "early");
        router.log(Severity::Info, "test", "queued");
        let late = memory(&router, "late");

        router.drain();
        assert_eq!(early.len(), 1);
        assert!(late.is_empty());
    }

    #[test]
    fn test_dispatch_to_unknown_target_does_not_occupy_batch() {
        let router = router(true);
        let target = memory(&router, "mem");

        for _ in 0..5 {
            router.dispatch_to(router.message(Severity::Info, "test", "lost"), "nobody");
        }
        router.log(Severity::Info, "test", "real");

        assert_eq!(router.pending_len(), 1);
        assert_eq!(router.drain(), 1);
        assert_eq!(target.bodies(), vec!["real"]);
    }

    #[test]
    fn test_drain_batch_size_is_adjustable() {
        let router = router(true);
        let target = memory(&router, "mem");
        for n in 0..8 {
            router.log(Severity::Info, "test", &format!("m{n}"));
        }

        router.set_drain_batch_size(0);
        assert_eq!(router.drain(), 1);
        router.set_drain_batch_size(3);
        assert_eq!(router.drain(), 3);
        assert_eq!(router.drain(), 3);
        assert_eq!(router.drain(), 1);
        assert_eq!(target.len(), 8);
    }

    /// Producers on runtime tasks, one drainer ticking like a host loop
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_async_producers_with_ticking_drain() {
        let router = router(true);
        let target = memory(&router, "mem");

        let mut producers = tokio::task::JoinSet::new();
        for t in 0..4 {
            let router = router.clone();
            producers.spawn(async move {
                for n in 0..25 {
                    router.log(Severity::Info, "task", &format!("{t}:{n}"));
                    tokio::task::yield_now().await;
                }
            });
        }
        while let Some(joined) = producers.join_next().await {
            joined.unwrap();
        }

        let mut interval = tokio::time::interval(std::time::Duration::from_millis(1));
        while router.pending_len() > 0 {
            interval.tick().await;
            assert!(router.drain() <= 5);
        }
        assert_eq!(target.len(), 100);
    }
}

#[cfg(test)]
mod pool_tests {
    use std::thread;

    use contracts::{LogRecord, RecordKind, Severity};

    use crate::support::{memory, router};

    #[test]
    fn test_recycled_record_comes_back_clean() {
        let router = router(false);
        let kind = RecordKind::from("net");

        let first = router.create_message(&kind, "payload", "net", Some("cyan"), Severity::Warning, None);
        let serial = first.serial();
        router.dispatch(first);

        let again = router.create_message(&kind, "", "", None, Severity::Debug, None);
        assert_eq!(again.serial(), serial);
        assert_eq!(again.body(), "");
        assert_eq!(again.color(), Severity::Debug.default_color());
        router.recycle(again);
    }

    #[test]
    fn test_round_trip_recycle_resets_fields() {
        let router = router(false);
        let kind = RecordKind::from("audit");

        let mut record = router.pool().checkout(&kind);
        let serial = record.serial();
        record.init("hello", "X", None, Severity::Error, None);
        record.recycle();

        let again = router.pool().checkout(&kind);
        assert_eq!(again.serial(), serial);
        assert_eq!(again.body(), "");
        assert_eq!(again.category(), "");
        assert_eq!(again.severity(), Severity::default());
        assert!(again.cause().is_none());
        assert!(again.call_stack().is_none());
        router.recycle(again);
    }

    #[test]
    fn test_foreign_record_is_not_recycled() {
        let router = router(false);
        let target = memory(&router, "mem");
        let kind = RecordKind::default();
        let free = router.pool().free_len(&kind);

        let mut foreign = LogRecord::new(kind.clone());
        foreign.init("handmade", "test", None, Severity::Info, None);
        router.dispatch(foreign);

        let bodies = target.bodies();
        assert_eq!(bodies[0], "handmade");
        assert!(bodies[1].contains("not created by the router"));
        // The warning record itself was pooled and went home
        assert!(router.pool().free_len(&kind) >= free);
    }

    #[test]
    fn test_pool_conservation_across_threads() {
        let router = router(false);
        let target = memory(&router, "mem");
        let kind = RecordKind::default();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let router = router.clone();
                thread::spawn(move || {
                    for n in 0..200 {
                        router.log(Severity::Info, "worker", &format!("{t}:{n}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(target.len(), 1600);
        // Every record ever allocated is back on its free-list
        assert_eq!(router.pool().free_len(&kind) as u64, router.pool().allocated());

        // No two live checkouts share a record
        let live: Vec<LogRecord> = (0..64).map(|_| router.message(Severity::Info, "t", "")).collect();
        let mut serials: Vec<u64> = live.iter().map(LogRecord::serial).collect();
        serials.sort_unstable();
        serials.dedup();
        assert_eq!(serials.len(), 64);
        for record in live {
            router.recycle(record);
        }
    }

    #[test]
    fn test_deferred_concurrent_producers_single_drainer() {
        let router = router(true);
        let target = memory(&router, "mem");

        let producers: Vec<_> = (0..4)
            .map(|t| {
                let router = router.clone();
                thread::spawn(move || {
                    for n in 0..50 {
                        router.log(Severity::Info, "worker", &format!("{t}:{n}"));
                    }
                })
            })
            .collect();
        for handle in producers {
            handle.join().unwrap();
        }

        while router.drain() > 0 {}
        assert_eq!(target.len(), 200);

        // Per-producer order survives the shared queue
        for t in 0..4 {
            let prefix = format!("{t}:");
            let seen: Vec<u32> = target
                .bodies()
                .iter()
                .filter_map(|b| b.strip_prefix(&prefix).and_then(|n| n.parse().ok()))
                .collect();
            assert_eq!(seen, (0..50).collect::<Vec<u32>>());
        }
    }
}

#[cfg(test)]
mod config_tests {
    use std::fs;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{RecordKind, Severity};
    use router::{Router, RouterError};
    use tempfile::tempdir;

    #[test]
    fn test_router_from_toml_file() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("app.jsonl");
        let config_path = dir.path().join("router.toml");
        fs::write(
            &config_path,
            format!(
                r#"
severity_filter = "warning"
deferred = true
drain_batch_size = 2
max_call_stack_frames = 0

[[seed_pools]]
kind = "audit"
size = 4

[[targets]]
id = "file"
kind = "file"
params = {{ path = "{}" }}
"#,
                log_path.display().to_string().replace('\\', "/")
            ),
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(&config_path).unwrap();
        let router = Router::from_config(&config).unwrap();
        assert!(router.is_deferred());
        assert_eq!(router.severity_filter(), Severity::Warning);
        assert_eq!(router.pool().free_len(&RecordKind::from("audit")), 4);

        router.log(Severity::Debug, "app", "filtered");
        router.log(Severity::Warning, "app", "first");
        router.log(Severity::Error, "app", "second");
        router.log(Severity::Fatal, "app", "third");

        assert_eq!(router.drain(), 2);
        router.shutdown();

        let lines: Vec<serde_json::Value> = fs::read_to_string(&log_path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let bodies: Vec<&str> = lines.iter().map(|l| l["body"].as_str().unwrap()).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
        assert_eq!(lines[1]["severity"], "error");
    }

    #[test]
    fn test_duplicate_target_ids_rejected() {
        let json = r#"{
            "targets": [
                { "id": "a", "kind": "memory" },
                { "id": "b", "kind": "memory" }
            ]
        }"#;
        let mut config = ConfigLoader::load_from_str(json, ConfigFormat::Json).unwrap();
        config.targets[1].id = "a".into();

        let result = Router::from_config(&config);
        assert!(matches!(result, Err(RouterError::DuplicateTarget { .. })));
    }

    #[test]
    fn test_invalid_config_rejected_by_loader() {
        let result = ConfigLoader::load_from_str("drain_batch_size = 0", ConfigFormat::Toml);
        assert!(result.is_err());
    }
}

#[cfg(test)]
mod observability_tests {
    use contracts::Severity;
    use observability::RouterMetricsAggregator;

    use crate::support::{memory, router};

    #[test]
    fn test_aggregator_tracks_router() {
        let router = router(true);
        let _target = memory(&router, "mem");
        let mut aggregator = RouterMetricsAggregator::new();

        for n in 0..7 {
            router.log(Severity::Info, "test", &n.to_string());
        }
        aggregator.update(router.metrics().snapshot());
        while router.drain() > 0 {
            aggregator.update(router.metrics().snapshot());
        }

        let summary = aggregator.summary();
        assert_eq!(summary.max_pending, 7);
        assert_eq!(summary.totals.submitted, 7);
        assert_eq!(summary.totals.delivered, 7);
        assert_eq!(summary.totals.pending, 0);
    }
}
