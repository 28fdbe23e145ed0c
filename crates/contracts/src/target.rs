//! Target trait - Router output interface
//!
//! Defines the abstract interface for sinks receiving routed records.

use crate::{ContractError, LogRecord, TargetId};

/// Log output trait
///
/// All target implementations must implement this trait. The router owns
/// registered targets behind an `Arc` and invokes them under its lock, so
/// implementations must not call back into the router from `log`.
pub trait Target: Send + Sync {
    /// Stable identifier; the registry holds at most one target per id
    fn id(&self) -> TargetId;

    /// Whether the target takes part in fan-out routing
    fn log_by_default(&self) -> bool;

    /// Whether the target wants call stacks rendered
    fn include_call_stack(&self) -> bool;

    /// Write one record
    ///
    /// # Errors
    /// Any error (or panic) marks the target as broken; the router evicts it.
    fn log(&self, record: &LogRecord) -> Result<(), ContractError>;

    /// Release resources. Called exactly once, when the target is removed.
    fn teardown(&self) {}
}
