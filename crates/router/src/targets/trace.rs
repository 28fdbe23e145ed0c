//! TracingTarget - forwards records as tracing events

use contracts::{ContractError, LogRecord, Severity, Target, TargetId};
use tracing::{debug, error, info, trace, warn};

/// Target that re-emits records through `tracing`
pub struct TracingTarget {
    id: TargetId,
    log_by_default: bool,
    include_call_stack: bool,
}

impl TracingTarget {
    /// Create a new TracingTarget with the given id
    pub fn new(id: impl Into<TargetId>, log_by_default: bool, include_call_stack: bool) -> Self {
        Self {
            id: id.into(),
            log_by_default,
            include_call_stack,
        }
    }

    fn emit(&self, record: &LogRecord) {
        let category = record.category();
        let body = record.body();
        let severity = record.severity();
        let call_stack = if self.include_call_stack {
            record.call_stack().unwrap_or_default()
        } else {
            ""
        };

        match severity {
            Severity::Verbose => trace!(target: "routed", %severity, category, call_stack, "{body}"),
            Severity::Debug | Severity::Guard => {
                debug!(target: "routed", %severity, category, call_stack, "{body}")
            }
            Severity::Warning => warn!(target: "routed", %severity, category, call_stack, "{body}"),
            Severity::Command | Severity::Info | Severity::Always => {
                info!(target: "routed", %severity, category, call_stack, "{body}")
            }
            Severity::Error | Severity::Exception | Severity::Critical | Severity::Fatal => {
                error!(target: "routed", %severity, category, call_stack, "{body}")
            }
        }
    }
}

impl Target for TracingTarget {
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
        self.emit(record);
        Ok(())
    }

    fn teardown(&self) {
        debug!(target_id = %self.id, "TracingTarget torn down");
    }
}
