use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors of the acquisition pipeline.
///
/// Session-level conditions (degenerate segment intersection, invalid
/// corner-index input) are not errors: they are surfaced as
/// [`crate::session::Effect`]s and recovered inside the workflow.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Camera parameter file missing, malformed, or numerically invalid.
    /// Raised before any capture happens.
    #[error("invalid camera parameters: {0}")]
    ConfigInvalid(String),

    /// No frame obtainable from the frame source; the acquisition session
    /// is never started.
    #[error("frame capture failed: {0}")]
    CaptureFailed(String),

    /// Failed to write an output artifact.
    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
}
