//! Process-wide router installation.
//!
//! Lives in its own test binary so nothing touches the global first.

use std::sync::Arc;

use contracts::{RouterConfig, Severity};
use router::{MemoryTarget, Router};

#[test]
fn test_install_global_then_reuse() {
    let configured = Router::new(&RouterConfig {
        deferred: true,
        max_call_stack_frames: 0,
        ..RouterConfig::default()
    });
    configured.set_severity_filter(Severity::Warning);
    let target = Arc::new(MemoryTarget::new("mem"));
    configured.register_target(target.clone());

    assert!(Router::install_global(configured).is_ok());

    let global = Router::global();
    assert!(std::ptr::eq(global, Router::global()));
    assert!(global.is_deferred());
    assert_eq!(global.severity_filter(), Severity::Warning);

    // Already installed: the second router is handed back
    assert!(Router::install_global(Router::default()).is_err());

    global.log(Severity::Error, "app", "through the global");
    assert_eq!(global.drain(), 1);
    assert_eq!(target.bodies(), vec!["through the global"]);
}
