// crates/orixa-core/src/audit.rs
// ============================================================================
// Module: Audit Sinks
// Description: JSON-lines sinks for engine mutation events.
// Purpose: Provide stderr and append-only file audit trails.
// Dependencies: crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! Both sinks serialize one [`EngineAuditEvent`] per line. Write failures are
//! dropped so auditing never changes engine behavior.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::interfaces::AuditSink;
use crate::interfaces::EngineAuditEvent;

// ============================================================================
// SECTION: Stderr Sink
// ============================================================================

/// Audit sink that writes JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &EngineAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr();
            let _ = writeln!(&mut stderr, "{payload}");
        }
    }
}

// ============================================================================
// SECTION: File Sink
// ============================================================================

/// Audit sink that appends JSON lines to a file.
#[derive(Debug)]
pub struct FileAuditSink {
    /// Open file handle for appending audit events.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens or creates the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, std::io::Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &EngineAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}
