//! LogRecord - reusable unit of one log event
//!
//! Records are allocated by a pool, checked out and initialized per log
//! call, and handed back through their [`RecycleHandle`] once every
//! resolved target has seen them.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{RecordKind, Severity};

/// Opaque error attached to a record
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Ownership token binding a checked-out record to the pool that issued it.
///
/// Consumed on release, so it runs at most once per checkout.
pub struct RecycleHandle(Box<dyn FnOnce(LogRecord) + Send>);

impl RecycleHandle {
    pub fn new(release: impl FnOnce(LogRecord) + Send + 'static) -> Self {
        Self(Box::new(release))
    }

    fn release(self, record: LogRecord) {
        (self.0)(record)
    }
}

impl fmt::Debug for RecycleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecycleHandle")
    }
}

/// One log event
pub struct LogRecord {
    kind: RecordKind,
    /// Allocation serial, stable across recycles
    serial: u64,
    body: String,
    category: String,
    severity: Severity,
    cause: Option<Cause>,
    color: String,
    created_at: DateTime<Utc>,
    call_stack: Option<String>,
    recycle: Option<RecycleHandle>,
}

impl LogRecord {
    /// Allocate a fresh, un-pooled record of `kind`
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
            body: String::new(),
            category: String::new(),
            severity: Severity::default(),
            cause: None,
            color: String::new(),
            created_at: DateTime::<Utc>::default(),
            call_stack: None,
            recycle: None,
        }
    }

    /// Reset the record to caller-supplied values.
    ///
    /// `color` falls back to the severity's default color.
    pub fn init(
        &mut self,
        body: &str,
        category: &str,
        color: Option<&str>,
        severity: Severity,
        cause: Option<Cause>,
    ) {
        self.body.clear();
        self.body.push_str(body);
        self.category.clear();
        self.category.push_str(category);
        self.color.clear();
        self.color
            .push_str(color.unwrap_or_else(|| severity.default_color()));
        self.severity = severity;
        self.cause = cause;
        self.created_at = Utc::now();
        self.call_stack = None;
    }

    /// Clear every field back to its default. Keeps buffer capacity.
    pub fn reset(&mut self) {
        self.body.clear();
        self.category.clear();
        self.color.clear();
        self.severity = Severity::default();
        self.cause = None;
        self.created_at = DateTime::<Utc>::default();
        self.call_stack = None;
    }

    /// Bind the record to the pool that issued it
    pub fn arm(&mut self, handle: RecycleHandle) {
        self.recycle = Some(handle);
    }

    /// Whether the record was checked out of a pool and not yet returned
    pub fn is_pooled(&self) -> bool {
        self.recycle.is_some()
    }

    /// Clear the record and hand it back to its pool.
    ///
    /// A record that was never checked out of a pool is dropped with a
    /// warning; this is misuse, not a fault.
    pub fn recycle(mut self) {
        self.reset();
        match self.recycle.take() {
            Some(handle) => handle.release(self),
            None => {
                tracing::warn!(
                    kind = %self.kind,
                    serial = self.serial,
                    "recycle called on a record that was not checked out of a pool"
                );
            }
        }
    }

    pub fn append(&mut self, text: &str) -> &mut Self {
        self.body.push_str(text);
        self
    }

    pub fn append_line(&mut self, text: &str) -> &mut Self {
        self.body.push_str(text);
        self.body.push('\n');
        self
    }

    pub fn set_call_stack(&mut self, call_stack: Option<String>) {
        self.call_stack = call_stack;
    }

    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn call_stack(&self) -> Option<&str> {
        self.call_stack.as_deref()
    }
}

impl fmt::Write for LogRecord {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.body.push_str(s);
        Ok(())
    }
}

impl fmt::Debug for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRecord")
            .field("kind", &self.kind)
            .field("serial", &self.serial)
            .field("severity", &self.severity)
            .field("category", &self.category)
            .field("body", &self.body)
            .field("pooled", &self.is_pooled())
            .finish()
    }
}
