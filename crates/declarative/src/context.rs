//! Apply context and progress callbacks
//!
//! These traits allow the declarative crate to be used without
//! depending on a specific terminal UI.

use crate::types::ReconciliationResult;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called when starting a batch of requests
    fn on_batch_start(&mut self, count: usize);

    /// Called when starting a single request
    fn on_resource_start(&mut self, label: &str);

    /// Called when a request completes
    fn on_resource_complete(&mut self, label: &str, result: &ReconciliationResult);

    /// Called when a batch completes
    fn on_batch_complete(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_resource_start(&mut self, _label: &str) {}
    fn on_resource_complete(&mut self, _label: &str, _result: &ReconciliationResult) {}
    fn on_batch_complete(&mut self) {}
}

/// Context passed to every apply call
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyContext {
    /// Validate the request and stop before touching the control plane
    pub dry_run: bool,
}
