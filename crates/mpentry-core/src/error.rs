//! Errors raised while loading inputs and committing a generation pass.

use std::io;
use std::path::PathBuf;

/// Errors that abort a generation pass.
///
/// Per-page write failures are not represented here; they are reported in
/// the pass outcome so sibling writes are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Required file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid manifest {}: expected a JSON object", .0.display())]
    InvalidManifest(PathBuf),

    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to serialize {what}: {message}")]
    Serialize { what: &'static str, message: String },
}

impl GenerateError {
    pub(crate) fn parse(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
