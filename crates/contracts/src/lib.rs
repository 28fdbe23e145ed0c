//! # Contracts
//!
//! Frozen interface contracts shared by the router and its collaborators.
//! Every other crate depends on this one; reverse dependencies are prohibited.
//!
//! ## Record lifecycle
//! `Free -> CheckedOut -> [Queued] -> Delivered -> Free`. A checked-out
//! record carries a [`RecycleHandle`] bound to the pool that issued it.

mod config;
mod error;
mod id;
mod record;
mod severity;
mod target;

pub use config::*;
pub use error::*;
pub use id::{RecordKind, TargetId};
pub use record::{Cause, LogRecord, RecycleHandle};
pub use severity::Severity;
pub use target::Target;
