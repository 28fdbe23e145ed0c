//! MemoryTarget - keeps delivered records in memory

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use contracts::{ContractError, LogRecord, Severity, Target, TargetId};

/// Owned copy of a delivered record; the original goes back to its pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    pub serial: u64,
    pub severity: Severity,
    pub category: String,
    pub body: String,
    pub color: String,
    pub call_stack: Option<String>,
}

impl CapturedRecord {
    fn capture(record: &LogRecord, with_call_stack: bool) -> Self {
        Self {
            serial: record.serial(),
            severity: record.severity(),
            category: record.category().to_string(),
            body: record.body().to_string(),
            color: record.color().to_string(),
            call_stack: if with_call_stack {
                record.call_stack().map(str::to_string)
            } else {
                None
            },
        }
    }
}

/// Target that records everything it receives
#[derive(Debug)]
pub struct MemoryTarget {
    id: TargetId,
    log_by_default: bool,
    include_call_stack: bool,
    records: Mutex<Vec<CapturedRecord>>,
    teardowns: AtomicUsize,
}

impl MemoryTarget {
    pub fn new(id: impl Into<TargetId>) -> Self {
        Self {
            id: id.into(),
            log_by_default: true,
            include_call_stack: false,
            records: Mutex::new(Vec::new()),
            teardowns: AtomicUsize::new(0),
        }
    }

    pub fn with_log_by_default(mut self, enabled: bool) -> Self {
        self.log_by_default = enabled;
        self
    }

    pub fn with_call_stack(mut self, enabled: bool) -> Self {
        self.include_call_stack = enabled;
        self
    }

    /// Copy of everything delivered so far, in delivery order
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Bodies delivered so far, in delivery order
    pub fn bodies(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|r| r.body.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Times `teardown` has run
    pub fn teardown_count(&self) -> usize {
        self.teardowns.load(Ordering::Relaxed)
    }
}

impl Target for MemoryTarget {
    fn id(&self) -> TargetId {
        self.id.clone()
    }

    fn log_by_default(&self) -> bool {
        self.log_by_default
    }

    fn include_call_stack(&self) -> bool {
        self.include_call_stack
    }

    fn log(&self, record: &LogRecord) -> Result<(), ContractError> {
        let captured = CapturedRecord::capture(record, self.include_call_stack);
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(captured);
        Ok(())
    }

    fn teardown(&self) {
        self.teardowns.fetch_add(1, Ordering::Relaxed);
    }
}
