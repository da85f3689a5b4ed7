//! # vtile Platform
//!
//! Filesystem collaborators of the tile creator:
//! - **Inputs**: wildcard expansion of subtexture file arguments
//! - **Outputs**: the per-run directory layout every phase writes into

pub mod filesystem;

pub use filesystem::{OutputFolder, OutputLayout, default_output_dir, expand_input_patterns, timestamp};

use thiserror::Error;

/// Platform-specific errors
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("File I/O error: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("No filenames were given to create atlas and tiles from")]
    NoInputFiles,

    #[error("No files matching the input were found: {0:?}")]
    NoMatches(Vec<String>),

    #[error("Invalid input pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Couldn't create output directory {path}: {source}")]
    OutputDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;
