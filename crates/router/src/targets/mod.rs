//! Reference target implementations
//!
//! Contains TracingTarget, FileTarget and MemoryTarget, plus the factory
//! that builds them from configuration.

mod file;
mod memory;
mod trace;

use std::sync::Arc;

use contracts::{Target, TargetConfig, TargetKind};
use tracing::instrument;

use crate::error::RouterError;

pub use self::file::{FileTarget, FileTargetConfig};
pub use self::memory::{CapturedRecord, MemoryTarget};
pub use self::trace::TracingTarget;

/// Create a target from configuration
#[instrument(
    name = "router_build_target",
    skip(config),
    fields(target_id = %config.id, kind = ?config.kind)
)]
pub fn build_target(config: &TargetConfig) -> Result<Arc<dyn Target>, RouterError> {
    match config.kind {
        TargetKind::Tracing => Ok(Arc::new(TracingTarget::new(
            config.id.clone(),
            config.log_by_default,
            config.include_call_stack,
        ))),
        TargetKind::File => {
            let file_config = FileTargetConfig::from_params(&config.params).ok_or_else(|| {
                RouterError::target_creation(config.id.as_str(), "missing 'path' parameter")
            })?;
            let target = FileTarget::new(
                config.id.clone(),
                file_config,
                config.log_by_default,
                config.include_call_stack,
            )
            .map_err(|e| RouterError::target_creation(config.id.as_str(), e.to_string()))?;
            Ok(Arc::new(target))
        }
        TargetKind::Memory => Ok(Arc::new(
            MemoryTarget::new(config.id.clone())
                .with_log_by_default(config.log_by_default)
                .with_call_stack(config.include_call_stack),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn target_config(kind: TargetKind, params: HashMap<String, String>) -> TargetConfig {
        TargetConfig {
            id: "t".into(),
            kind,
            log_by_default: false,
            include_call_stack: true,
            params,
        }
    }

    #[test]
    fn test_build_memory_target_keeps_flags() {
        let target = build_target(&target_config(TargetKind::Memory, HashMap::new())).unwrap();
        assert_eq!(target.id(), "t");
        assert!(!target.log_by_default());
        assert!(target.include_call_stack());
    }

    #[test]
    fn test_build_file_target_without_path_fails() {
        let result = build_target(&target_config(TargetKind::File, HashMap::new()));
        assert!(matches!(result, Err(RouterError::TargetCreation { .. })));
    }

    #[test]
    fn test_build_file_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let params = HashMap::from([("path".to_string(), path.display().to_string())]);
        let target = build_target(&target_config(TargetKind::File, params)).unwrap();
        assert_eq!(target.id(), "t");
        assert!(path.exists());
    }
}
