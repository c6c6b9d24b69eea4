//! Error types for sdfgrid

use thiserror::Error;

/// Result type alias using the sdfgrid Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in grid operations
#[derive(Error, Debug)]
pub enum Error {
    /// An operation produced no solid voxels
    #[error("{0} produced no solid voxels")]
    EmptyResult(&'static str),

    /// All three central differences were exactly zero
    #[error("Gradient is degenerate at the sampled point")]
    DegenerateGradient,

    /// Combinator operands were sampled at different resolutions
    #[error("Mismatched voxel size: primary {primary}, secondary {secondary}")]
    MismatchedVoxelSize { primary: f32, secondary: f32 },

    /// The destination buffer could not be allocated
    #[error("Resource exhaustion: {0}")]
    ResourceExhaustion(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
