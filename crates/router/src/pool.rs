//! Per-kind free-lists of log records
//!
//! A kind seen for the first time is pre-filled with `default_size`
//! records. Afterwards an empty free-list falls back to a one-off
//! allocation, so hot-path allocation stays near zero for every kind
//! that has been seen before.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use contracts::{LogRecord, RecordKind, RecycleHandle};
use tracing::{debug, trace};

#[derive(Debug)]
struct PoolInner {
    free: HashMap<RecordKind, Vec<LogRecord>>,
    default_size: usize,
    /// Max free records kept per kind (None = unbounded)
    cap: Option<usize>,
    allocated: u64,
}

impl PoolInner {
    fn allocate(&mut self, kind: &RecordKind) -> LogRecord {
        self.allocated += 1;
        LogRecord::new(kind.clone())
    }

    fn fill(&mut self, kind: &RecordKind, size: usize) {
        let fresh: Vec<LogRecord> = (0..size).map(|_| LogRecord::new(kind.clone())).collect();
        self.allocated += fresh.len() as u64;
        self.free.entry(kind.clone()).or_default().extend(fresh);
    }

    fn put(&mut self, record: LogRecord) {
        let cap = self.cap;
        let free = self.free.entry(record.kind().clone()).or_default();
        if cap.is_some_and(|cap| free.len() >= cap) {
            trace!(kind = %record.kind(), "pool at capacity, dropping record");
            return;
        }
        free.push(record);
    }
}

/// Record pool shared by every router handle
#[derive(Debug, Clone)]
pub struct RecordPool {
    inner: Arc<Mutex<PoolInner>>,
}

impl RecordPool {
    /// Create an empty pool
    pub fn new(default_size: usize, cap: Option<usize>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PoolInner {
                free: HashMap::new(),
                default_size,
                cap,
                allocated: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolInner> {
        lock_inner(&self.inner)
    }

    /// Pre-fill the free-list of `kind` with `size` fresh records
    pub fn seed(&self, kind: &RecordKind, size: usize) {
        debug!(kind = %kind, size, "seeding record pool");
        self.lock().fill(kind, size);
    }

    /// Take a record of `kind`, armed to return to this pool on recycle
    pub fn checkout(&self, kind: &RecordKind) -> LogRecord {
        let mut record = {
            let mut inner = self.lock();
            match inner.free.get_mut(kind) {
                Some(free) => match free.pop() {
                    Some(record) => record,
                    None => inner.allocate(kind),
                },
                None => {
                    let size = inner.default_size;
                    debug!(kind = %kind, size, "first checkout of kind, pre-filling pool");
                    inner.fill(kind, size);
                    match inner.free.get_mut(kind).and_then(Vec::pop) {
                        Some(record) => record,
                        None => inner.allocate(kind),
                    }
                }
            }
        };
        record.arm(self.recycle_handle());
        record
    }

    fn recycle_handle(&self) -> RecycleHandle {
        let pool: Weak<Mutex<PoolInner>> = Arc::downgrade(&self.inner);
        RecycleHandle::new(move |record| {
            // Pool gone: the record is simply dropped
            if let Some(inner) = pool.upgrade() {
                lock_inner(&inner).put(record);
            }
        })
    }

    /// Free records currently held for `kind`
    pub fn free_len(&self, kind: &RecordKind) -> usize {
        self.lock().free.get(kind).map_or(0, Vec::len)
    }

    /// Whether `kind` has a free-list (seeded or seen before)
    pub fn knows(&self, kind: &RecordKind) -> bool {
        self.lock().free.contains_key(kind)
    }

    /// Total records ever allocated by this pool
    pub fn allocated(&self) -> u64 {
        self.lock().allocated
    }
}

fn lock_inner(inner: &Mutex<PoolInner>) -> MutexGuard<'_, PoolInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
