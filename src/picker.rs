//! Destination selection seam between the core and its front end.
//!
//! The orchestrator asks its picker for the directory the finished
//! artifact should land in. A GUI implements this with a native folder
//! dialog; the CLI returns a preconfigured path. Returning `None` means
//! the user cancelled selection, which aborts the session before any
//! resource is allocated.

use std::path::PathBuf;

use async_trait::async_trait;

/// Supplies the destination directory for a build's artifact.
#[async_trait]
pub trait DestinationPicker: Send + Sync {
    /// Returns the chosen directory, or `None` when the user cancelled.
    async fn pick_destination(&self) -> Option<PathBuf>;
}

/// Picker that always returns a fixed, pre-chosen directory.
#[derive(Debug, Clone)]
pub struct FixedDestination(PathBuf);

impl FixedDestination {
    /// Wraps an already-selected destination directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self(dir.into())
    }
}

#[async_trait]
impl DestinationPicker for FixedDestination {
    async fn pick_destination(&self) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

/// Picker that always reports cancellation; used by tests and as the
/// safe default when no destination is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelledPicker;

#[async_trait]
impl DestinationPicker for CancelledPicker {
    async fn pick_destination(&self) -> Option<PathBuf> {
        None
    }
}
