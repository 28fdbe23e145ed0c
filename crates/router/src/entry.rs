//! DispatchEntry - one queued record with its resolved target set

use std::collections::HashSet;

use contracts::{LogRecord, TargetId};

/// A record paired with the targets it must still reach.
///
/// Entries are pooled; every reuse goes through [`DispatchEntry::renew`].
#[derive(Debug, Default)]
pub struct DispatchEntry {
    record: Option<LogRecord>,
    targets: HashSet<TargetId>,
}

impl DispatchEntry {
    /// Reassign the record and replace the target set
    pub fn renew(&mut self, record: LogRecord, targets: impl IntoIterator<Item = TargetId>) {
        self.targets.clear();
        self.targets.extend(targets);
        self.record = Some(record);
    }

    /// Take the record out, leaving the entry record-less
    pub fn take_record(&mut self) -> Option<LogRecord> {
        self.record.take()
    }

    pub fn record(&self) -> Option<&LogRecord> {
        self.record.as_ref()
    }

    /// Resolved targets (unordered)
    pub fn targets(&self) -> &HashSet<TargetId> {
        &self.targets
    }

    /// Clear both fields
    pub fn clear(&mut self) {
        self.record = None;
        self.targets.clear();
    }
}

/// Shared free-list of dispatch entries
#[derive(Debug, Default)]
pub struct EntryPool {
    free: Vec<DispatchEntry>,
}

impl EntryPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a free entry or construct a new one
    pub fn checkout(&mut self) -> DispatchEntry {
        self.free.pop().unwrap_or_default()
    }

    /// Clear and keep an entry for reuse
    pub fn give_back(&mut self, mut entry: DispatchEntry) {
        entry.clear();
        self.free.push(entry);
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }
}
