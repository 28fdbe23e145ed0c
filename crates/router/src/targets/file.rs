//! FileTarget - appends records to a file as JSON lines

use chrono::SecondsFormat;
use contracts::{ContractError, LogRecord, Severity, Target, TargetId};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error};

/// Configuration for FileTarget
#[derive(Debug, Clone)]
pub struct FileTargetConfig {
    /// Output file, created (with parents) if missing
    pub path: PathBuf,
}

impl FileTargetConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Option<Self> {
        params.get("path").map(|path| Self {
            path: PathBuf::from(path),
        })
    }
}

/// One line of output
#[derive(Serialize)]
struct FileLine<'a> {
    ts: String,
    severity: Severity,
    category: &'a str,
    color: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    call_stack: Option<&'a str>,
}

/// Target that appends JSON lines to a file
pub struct FileTarget {
    id: TargetId,
    log_by_default: bool,
    include_call_stack: bool,
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileTarget {
    /// Open (or create) the output file
    pub fn new(
        id: impl Into<TargetId>,
        config: FileTargetConfig,
        log_by_default: bool,
        include_call_stack: bool,
    ) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        Ok(Self {
            id: id.into(),
            log_by_default,
            include_call_stack,
            path: config.path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn write_line(&self, record: &LogRecord) -> std::io::Result<()> {
        let line = FileLine {
            ts: record
                .created_at()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            severity: record.severity(),
            category: record.category(),
            color: record.color(),
            body: record.body(),
            cause: record.cause().map(|cause| cause.to_string()),
            call_stack: if self.include_call_stack {
                record.call_stack()
            } else {
                None
            },
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_writer(&mut *writer, &line)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl Target for FileTarget {
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
        self.write_line(record)
            .map_err(|e| ContractError::target_write(self.id.as_str(), e.to_string()))
    }

    fn teardown(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.flush() {
            error!(target_id = %self.id, error = %e, "Flush failed on teardown");
        }
        debug!(target_id = %self.id, path = %self.path.display(), "FileTarget closed");
    }
}
