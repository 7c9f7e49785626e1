//! Scan progress events.
//!
//! The scanner reports through an injected handler instead of a global
//! console; external surfaces implement `ScanEventHandler` to drive
//! progress bars or structured logs.

use std::path::PathBuf;

/// Emitted when a scan begins.
#[derive(Debug, Clone)]
pub struct ScanStarted {
    pub root: PathBuf,
}

/// Emitted periodically while files are processed.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    pub processed: usize,
    pub total: usize,
}

/// Emitted when a scan finishes.
#[derive(Debug, Clone)]
pub struct ScanCompleted {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub duration_ms: u64,
}

/// Callback surface for scan lifecycle events.
pub trait ScanEventHandler: Send + Sync {
    fn on_started(&self, _event: &ScanStarted) {}
    fn on_progress(&self, _event: &ScanProgress) {}
    fn on_completed(&self, _event: &ScanCompleted) {}
    fn on_error(&self, _message: &str) {}
}

/// Default handler that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl ScanEventHandler for NoopEvents {}
