//! RouterConfig - Config Loader output
//!
//! Describes the router's tunables, pre-seeded pools and the targets a
//! host wants registered at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{RecordKind, Severity, TargetId};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Records below this level are dropped
    #[serde(default)]
    pub severity_filter: SeverityFilter,

    /// Maximum captured call-stack frames (0 disables capture)
    #[serde(default = "default_max_call_stack_frames")]
    pub max_call_stack_frames: usize,

    /// Queue dispatches and deliver them from `drain`
    #[serde(default)]
    pub deferred: bool,

    /// Maximum dispatch entries processed per `drain` call
    #[serde(default = "default_drain_batch_size")]
    pub drain_batch_size: usize,

    /// Records pre-filled when a kind is first seen
    #[serde(default = "default_pool_size")]
    pub default_pool_size: usize,

    /// Upper bound on free records per kind (None = unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_cap: Option<usize>,

    /// Pools seeded at construction
    #[serde(default)]
    pub seed_pools: Vec<SeedPool>,

    /// Targets registered at startup
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// Newtype so the filter defaults to the lowest level rather than `Severity::default()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityFilter(pub Severity);

impl Default for SeverityFilter {
    fn default() -> Self {
        Self(Severity::MIN)
    }
}

fn default_max_call_stack_frames() -> usize {
    32
}

fn default_drain_batch_size() -> usize {
    5
}

fn default_pool_size() -> usize {
    16
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            version: ConfigVersion::default(),
            severity_filter: SeverityFilter::default(),
            max_call_stack_frames: default_max_call_stack_frames(),
            deferred: false,
            drain_batch_size: default_drain_batch_size(),
            default_pool_size: default_pool_size(),
            pool_cap: None,
            seed_pools: Vec::new(),
            targets: Vec::new(),
        }
    }
}

/// Pre-seeded record pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedPool {
    pub kind: RecordKind,
    pub size: usize,
}

/// Target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Target identifier
    pub id: TargetId,

    /// Target type
    pub kind: TargetKind,

    #[serde(default = "default_true")]
    pub log_by_default: bool,

    #[serde(default)]
    pub include_call_stack: bool,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

/// Target type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Forward into `tracing`
    Tracing,
    /// Append JSON lines to a file
    File,
    /// Keep records in memory
    Memory,
}
