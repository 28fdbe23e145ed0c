//! Router - registry, severity filter and fan-out of log records
//!
//! One lock guards the registry, the deferred queue and the entry pool.
//! Record free-lists live behind their own lock inside [`RecordPool`],
//! which is only ever taken after (never around) the router lock.

use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use contracts::{
    Cause, ContractError, LogRecord, RecordKind, RouterConfig, Severity, Target, TargetId,
};
use tracing::{debug, error, info, instrument, warn};

use crate::callstack;
use crate::entry::{DispatchEntry, EntryPool};
use crate::error::RouterError;
use crate::metrics::RouterMetrics;
use crate::pool::RecordPool;
use crate::targets::build_target;

/// Category of messages the router emits about itself
pub const ROUTER_CATEGORY: &str = "router";

static GLOBAL: OnceLock<Router> = OnceLock::new();

/// Which registered targets a record goes to
#[derive(Debug, Clone, Copy)]
enum Route<'a> {
    /// Every default-enabled target
    All,
    /// Every default-enabled target but one
    Excluding(&'a str),
    /// Exactly one target, if registered
    To(&'a str),
}

/// A message the router owes the pipeline once its lock is released
#[derive(Debug)]
struct Report {
    severity: Severity,
    body: String,
}

struct RouterState {
    targets: HashMap<TargetId, Arc<dyn Target>>,
    deferred: bool,
    drain_batch_size: usize,
    pending: VecDeque<DispatchEntry>,
    entries: EntryPool,
}

struct Shared {
    state: Mutex<RouterState>,
    pool: RecordPool,
    metrics: RouterMetrics,
    filter: AtomicU8,
    max_call_stack_frames: AtomicUsize,
}

/// Handle to a router. Clones share the same registry, pools and queue.
///
/// A router is meant to live for the whole process: build one at startup
/// (or use [`Router::global`]) and pass handles to every call site.
#[derive(Clone)]
pub struct Router {
    shared: Arc<Shared>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(&RouterConfig::default())
    }
}

impl Router {
    /// Create a router from configuration, without registering targets
    pub fn new(config: &RouterConfig) -> Self {
        let pool = RecordPool::new(config.default_pool_size, config.pool_cap);
        for seed in &config.seed_pools {
            pool.seed(&seed.kind, seed.size);
        }

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RouterState {
                    targets: HashMap::new(),
                    deferred: config.deferred,
                    drain_batch_size: config.drain_batch_size.max(1),
                    pending: VecDeque::new(),
                    entries: EntryPool::new(),
                }),
                pool,
                metrics: RouterMetrics::new(),
                filter: AtomicU8::new(config.severity_filter.0.ordinal()),
                max_call_stack_frames: AtomicUsize::new(config.max_call_stack_frames),
            }),
        }
    }

    /// Create a router and register every configured target
    #[instrument(
        name = "router_from_config",
        skip(config),
        fields(target_count = config.targets.len())
    )]
    pub fn from_config(config: &RouterConfig) -> Result<Self, RouterError> {
        let router = Self::new(config);
        for target_config in &config.targets {
            let target = build_target(target_config)?;
            if !router.register_target(target) {
                return Err(RouterError::DuplicateTarget {
                    id: target_config.id.to_string(),
                });
            }
        }
        Ok(router)
    }

    /// Process-wide router, built with default configuration on first use
    pub fn global() -> &'static Router {
        GLOBAL.get_or_init(Router::default)
    }

    /// Install `router` as the process-wide router.
    ///
    /// Fails (handing the router back) if one is already in place.
    pub fn install_global(router: Router) -> Result<(), Router> {
        GLOBAL.set(router)
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ===== Configuration =====

    /// Drop everything below `level` from now on
    pub fn set_severity_filter(&self, level: Severity) {
        self.shared.filter.store(level.ordinal(), Ordering::Relaxed);
    }

    pub fn severity_filter(&self) -> Severity {
        Severity::from_ordinal(i64::from(self.shared.filter.load(Ordering::Relaxed)))
    }

    /// Whether a record of `severity` is processed at all
    pub fn passes_filter(&self, severity: Severity) -> bool {
        severity >= self.severity_filter()
    }

    /// Cap captured call stacks at `frames` (0 disables capture)
    pub fn set_max_call_stack_frames(&self, frames: usize) {
        self.shared
            .max_call_stack_frames
            .store(frames, Ordering::Relaxed);
    }

    pub fn max_call_stack_frames(&self) -> usize {
        self.shared.max_call_stack_frames.load(Ordering::Relaxed)
    }

    /// Switch between immediate and deferred delivery.
    ///
    /// Turning deferred mode off delivers whatever is still queued before
    /// returning, so no accepted record is lost.
    #[instrument(name = "router_enable_deferred", skip(self))]
    pub fn enable_deferred_dispatch(&self, enabled: bool) {
        let mut reports = Vec::new();
        {
            let mut state = self.lock();
            if state.deferred == enabled {
                return;
            }
            state.deferred = enabled;
            if !enabled {
                let flushed = state.pending.len();
                while let Some(entry) = state.pending.pop_front() {
                    self.deliver_entry(&mut state, entry, &mut reports);
                }
                self.shared.metrics.add_drained(flushed);
                self.shared.metrics.set_pending(0);
                if flushed > 0 {
                    debug!(entries = flushed, "flushed pending entries");
                }
            }
        }
        self.submit_reports(reports);
    }

    pub fn is_deferred(&self) -> bool {
        self.lock().deferred
    }

    /// Change the per-drain batch size (clamped to at least 1)
    pub fn set_drain_batch_size(&self, size: usize) {
        self.lock().drain_batch_size = size.max(1);
    }

    // ===== Registry =====

    /// Register `target` under its id. Returns false if the id is taken.
    #[instrument(name = "router_register_target", skip(self, target), fields(target_id = %target.id()))]
    pub fn register_target(&self, target: Arc<dyn Target>) -> bool {
        let id = target.id();
        let mut state = self.lock();
        if state.targets.contains_key(&id) {
            debug!("target already registered, ignoring");
            return false;
        }
        state.targets.insert(id, target);
        info!(targets = state.targets.len(), "target registered");
        true
    }

    /// Tear down and unregister a target. Returns false if it was not registered.
    #[instrument(name = "router_remove_target", skip(self))]
    pub fn remove_target(&self, id: &str) -> bool {
        let mut state = self.lock();
        let Some(target) = state.targets.get(id).cloned() else {
            return false;
        };
        teardown(&*target);
        state.targets.remove(id);
        info!(targets = state.targets.len(), "target removed");
        true
    }

    /// Registered target with this id
    pub fn get_target(&self, id: &str) -> Option<Arc<dyn Target>> {
        self.lock().targets.get(id).cloned()
    }

    /// Ids of every registered target (unordered)
    pub fn target_ids(&self) -> Vec<TargetId> {
        self.lock().targets.keys().cloned().collect()
    }

    // ===== Records =====

    /// Check a record out of the pool and initialize it.
    ///
    /// This is the only way to obtain a record the router can recycle.
    pub fn create_message(
        &self,
        kind: &RecordKind,
        body: &str,
        category: &str,
        color: Option<&str>,
        severity: Severity,
        cause: Option<Cause>,
    ) -> LogRecord {
        let mut record = self.shared.pool.checkout(kind);
        record.init(body, category, color, severity, cause);
        record
    }

    /// `create_message` with the default kind and color
    pub fn message(&self, severity: Severity, category: &str, body: &str) -> LogRecord {
        self.create_message(&RecordKind::default(), body, category, None, severity, None)
    }

    /// Create and dispatch a message to every default-enabled target
    pub fn log(&self, severity: Severity, category: &str, body: &str) {
        if !self.passes_filter(severity) {
            self.shared.metrics.inc_filtered();
            return;
        }
        let record = self.message(severity, category, body);
        self.dispatch(record);
    }

    /// Hand a record back to its pool.
    ///
    /// Records not created by [`Router::create_message`] are dropped and
    /// reported as a warning.
    pub fn recycle(&self, record: LogRecord) {
        let mut reports = Vec::new();
        release(record, &mut reports);
        self.submit_reports(reports);
    }

    pub fn pool(&self) -> &RecordPool {
        &self.shared.pool
    }

    // ===== Routing =====

    /// Route to every registered target with `log_by_default`
    pub fn dispatch(&self, record: LogRecord) {
        self.route(record, Route::All);
    }

    /// Route to every default-enabled target except `excluded`
    pub fn dispatch_excluding(&self, record: LogRecord, excluded: &str) {
        self.route(record, Route::Excluding(excluded));
    }

    /// Route to exactly one target; a no-op if it is not registered
    pub fn dispatch_to(&self, record: LogRecord, id: &str) {
        self.route(record, Route::To(id));
    }

    fn route(&self, mut record: LogRecord, route: Route<'_>) {
        if !self.passes_filter(record.severity()) {
            self.shared.metrics.inc_filtered();
            // Filtered records never reach a target; pooled ones still go home
            if record.is_pooled() {
                record.recycle();
            }
            return;
        }
        self.shared.metrics.inc_submitted();

        let frames = self.max_call_stack_frames();
        if frames > 0 {
            record.set_call_stack(callstack::capture(frames));
        }

        let mut reports = Vec::new();
        {
            let mut state = self.lock();
            let RouterState {
                targets,
                deferred,
                pending,
                entries,
                ..
            } = &mut *state;

            let resolved: Vec<TargetId> = resolve(targets, route).cloned().collect();
            if resolved.is_empty() && matches!(route, Route::To(_)) {
                // Unregistered destination: nothing to queue or invoke
                release(record, &mut reports);
            } else if *deferred {
                let mut entry = entries.checkout();
                entry.renew(record, resolved);
                pending.push_back(entry);
                self.shared.metrics.set_pending(pending.len());
            } else {
                for id in &resolved {
                    self.invoke_target(targets, id, &record, &mut reports);
                }
                release(record, &mut reports);
            }
        }
        self.submit_reports(reports);
    }

    /// Deliver up to one batch of queued entries, oldest first.
    ///
    /// Returns the number of entries processed. A no-op unless deferred
    /// mode is on; call repeatedly to empty the queue.
    pub fn drain(&self) -> usize {
        let mut reports = Vec::new();
        let processed = {
            let mut state = self.lock();
            if !state.deferred || state.pending.is_empty() {
                return 0;
            }
            let batch = state.drain_batch_size.min(state.pending.len());
            for _ in 0..batch {
                let Some(entry) = state.pending.pop_front() else {
                    break;
                };
                self.deliver_entry(&mut state, entry, &mut reports);
            }
            self.shared.metrics.set_pending(state.pending.len());
            batch
        };
        self.shared.metrics.add_drained(processed);
        debug!(entries = processed, "drained dispatch entries");
        self.submit_reports(reports);
        processed
    }

    /// Dispatch entries waiting for `drain`
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Drain everything queued, then tear down every registered target.
    ///
    /// The router stays usable afterwards with an empty registry.
    #[instrument(name = "router_shutdown", skip(self))]
    pub fn shutdown(&self) {
        while self.drain() > 0 {}

        let targets: Vec<Arc<dyn Target>> = {
            let mut state = self.lock();
            state.targets.drain().map(|(_, target)| target).collect()
        };
        for target in &targets {
            teardown(&**target);
        }
        info!(targets = targets.len(), "router shut down");
    }

    pub fn metrics(&self) -> &RouterMetrics {
        &self.shared.metrics
    }

    fn deliver_entry(
        &self,
        state: &mut RouterState,
        mut entry: DispatchEntry,
        reports: &mut Vec<Report>,
    ) {
        if let Some(record) = entry.take_record() {
            for id in entry.targets() {
                self.invoke_target(&mut state.targets, id, &record, reports);
            }
            release(record, reports);
        }
        state.entries.give_back(entry);
    }

    /// Deliver one record to one target, evicting the target if it fails
    fn invoke_target(
        &self,
        targets: &mut HashMap<TargetId, Arc<dyn Target>>,
        id: &TargetId,
        record: &LogRecord,
        reports: &mut Vec<Report>,
    ) {
        // Removed since resolution: skip silently
        let Some(target) = targets.get(id).cloned() else {
            return;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| target.log(record)))
            .unwrap_or_else(|payload| {
                Err(ContractError::target_panicked(
                    id.as_str(),
                    panic_message(payload.as_ref()),
                ))
            });

        match outcome {
            Ok(()) => self.shared.metrics.inc_delivered(),
            Err(e) => {
                self.shared.metrics.inc_failures();
                targets.remove(id);
                teardown(&*target);
                self.shared.metrics.inc_evicted();
                error!(target_id = %id, error = %e, "target failed, removed from registry");
                reports.push(Report {
                    severity: Severity::Error,
                    body: format!("target '{id}' failed and was removed: {e}"),
                });
            }
        }
    }

    /// Submit owed messages through the normal pipeline. Never call with the lock held.
    fn submit_reports(&self, reports: Vec<Report>) {
        for report in reports {
            self.log(report.severity, ROUTER_CATEGORY, &report.body);
        }
    }
}

/// Resolve a route against the registry
fn resolve<'a>(
    targets: &'a HashMap<TargetId, Arc<dyn Target>>,
    route: Route<'a>,
) -> impl Iterator<Item = &'a TargetId> + 'a {
    targets
        .iter()
        .filter(move |(id, target)| match route {
            Route::All => target.log_by_default(),
            Route::Excluding(excluded) => target.log_by_default() && id.as_str() != excluded,
            Route::To(only) => id.as_str() == only,
        })
        .map(|(id, _)| id)
}

/// Return a delivered record to its pool, or report misuse
fn release(record: LogRecord, reports: &mut Vec<Report>) {
    if record.is_pooled() {
        record.recycle();
    } else {
        warn!(
            kind = %record.kind(),
            serial = record.serial(),
            "record was not created by the router, not recycled"
        );
        reports.push(Report {
            severity: Severity::Warning,
            body: format!(
                "recycle ignored for record #{} of kind '{}': not created by the router",
                record.serial(),
                record.kind()
            ),
        });
    }
}

fn teardown(target: &dyn Target) {
    let id = target.id();
    if panic::catch_unwind(AssertUnwindSafe(|| target.teardown())).is_err() {
        error!(target_id = %id, "target panicked during teardown");
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
