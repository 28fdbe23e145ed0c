//! Severity levels
//!
//! Totally ordered; comparison is by ordinal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ContractError;

/// Severity of a log record, lowest to highest.
///
/// `Always` is a sentinel ceiling: filtering at `Always` suppresses
/// everything except records explicitly tagged `Always`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    Verbose = 0,
    Debug,
    Guard,
    Warning,
    Command,
    #[default]
    Info,
    Error,
    Exception,
    Critical,
    Fatal,
    Always,
}

impl Severity {
    pub const MIN: Severity = Severity::Verbose;
    pub const MAX: Severity = Severity::Always;

    /// All levels in ascending order
    pub const ALL: [Severity; 11] = [
        Severity::Verbose,
        Severity::Debug,
        Severity::Guard,
        Severity::Warning,
        Severity::Command,
        Severity::Info,
        Severity::Error,
        Severity::Exception,
        Severity::Critical,
        Severity::Fatal,
        Severity::Always,
    ];

    /// Numeric ordinal
    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Map an arbitrary integer onto a level, clamping into `[MIN, MAX]`.
    pub fn from_ordinal(value: i64) -> Self {
        let max = i64::from(Self::MAX.ordinal());
        let idx = value.clamp(0, max) as usize;
        Self::ALL[idx]
    }

    /// Lower-case name, as used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Verbose => "verbose",
            Severity::Debug => "debug",
            Severity::Guard => "guard",
            Severity::Warning => "warning",
            Severity::Command => "command",
            Severity::Info => "info",
            Severity::Error => "error",
            Severity::Exception => "exception",
            Severity::Critical => "critical",
            Severity::Fatal => "fatal",
            Severity::Always => "always",
        }
    }

    /// Display color used when the caller does not supply one
    pub fn default_color(self) -> &'static str {
        match self {
            Severity::Verbose => "grey",
            Severity::Debug => "cyan",
            Severity::Guard => "magenta",
            Severity::Warning => "yellow",
            Severity::Command => "blue",
            Severity::Info => "white",
            Severity::Error | Severity::Exception => "red",
            Severity::Critical | Severity::Fatal => "darkred",
            Severity::Always => "green",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| ContractError::Other(format!("unknown severity: {s}")))
    }
}
