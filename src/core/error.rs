//! Error types for the sort-last rendering core

use thiserror::Error;

/// Main error type for the renderer core
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A logic bug: the caller or this crate broke an invariant.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Compositing for the current frame was abandoned; the next frame may succeed.
    #[error("Composite skipped: {0}")]
    CompositeSkipped(String),
}
