//! Error taxonomy for the synthesis and linking passes.
//!
//! Every variant carries the path it failed on so batch reports can name the
//! offending file without extra bookkeeping.

use std::path::{Path, PathBuf};

/// Per-file failure raised by the scanner, synthesizer or linker.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error("Failed to decode image {path:?}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write image {path:?}: {reason}")]
    ImageWrite { path: PathBuf, reason: String },

    #[error("Failed to create parent directory for {path:?}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed material data in {path:?}: {reason}")]
    MaterialParse { path: PathBuf, reason: String },

    #[error("I/O error on {path:?}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ForgeError {
    pub fn file_io(path: &Path, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Path of the file that failed, if the error is tied to one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::ImageRead { path, .. }
            | Self::ImageWrite { path, .. }
            | Self::PathResolution { path, .. }
            | Self::MaterialParse { path, .. }
            | Self::FileIo { path, .. } => Some(path),
            Self::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;
