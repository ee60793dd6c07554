//! Error types for bake operations

use std::path::PathBuf;

use crate::diagnostics::Diagnostic;

/// Error raised while planning or running a bake
#[derive(Debug, thiserror::Error)]
pub enum BakeError {
    /// A blocking precondition is active for the domain
    #[error("bake blocked: {0}")]
    Blocked(Diagnostic),

    /// `step` was called after the bake finished or failed
    #[error("bake has already finished")]
    AlreadyFinished,

    /// A configuration value is outside its accepted range
    #[error("invalid bake configuration: {0}")]
    InvalidConfig(String),

    /// Vertex count or frame count is zero, so there is nothing to lay out
    #[error("cannot plan a texture for {vertices} vertices x {frames} frames")]
    EmptyPixelDemand { vertices: usize, frames: u32 },

    /// The requested clip does not exist on the rig
    #[error("clip '{0}' not found on rig")]
    ClipNotFound(String),

    /// Single-clip frame range selects no frames
    #[error("frame range {min}..{max} of clip '{clip}' is empty")]
    EmptyFrameRange { clip: String, min: u32, max: u32 },

    /// No clip on the rig produces a single frame at the chosen rate
    #[error("no clip produces any frames at {fps} fps")]
    NothingToBake { fps: u32 },

    /// The evaluator returned a snapshot with a different vertex count
    #[error("clip '{clip}' frame {frame}: expected {expected} vertices, got {actual}")]
    VertexCountChanged {
        clip: String,
        frame: u32,
        expected: usize,
        actual: usize,
    },

    /// A texture array byte stream could not be decoded
    #[error("invalid texture array: {0}")]
    InvalidTextureArray(String),

    /// Failed to write an output file
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image container encoding failed
    #[error("failed to encode {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failure raised by an external evaluator, mesh source or writer
    #[error(transparent)]
    External(#[from] anyhow::Error),
}

/// Result alias for bake operations
pub type BakeResult<T> = Result<T, BakeError>;
