//! # Router
//!
//! In-process log routing.
//!
//! Responsibilities:
//! - Filter records by severity
//! - Fan records out to all / all-but-one / exactly-one registered target
//! - Deliver immediately, or queue and drain in bounded batches
//! - Pool records and dispatch entries so logging does not allocate per call
//! - Evict targets that fail, reporting the failure through the same pipeline

pub mod callstack;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod router;
pub mod targets;

pub use contracts::{LogRecord, RecordKind, Severity, Target, TargetId};
pub use entry::{DispatchEntry, EntryPool};
pub use error::RouterError;
pub use metrics::{RouterMetrics, RouterMetricsSnapshot};
pub use pool::RecordPool;
pub use router::{Router, ROUTER_CATEGORY};
pub use targets::{
    build_target, CapturedRecord, FileTarget, FileTargetConfig, MemoryTarget, TracingTarget,
};
