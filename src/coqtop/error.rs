//! Collection error types.

use std::path::{Path, PathBuf};

/// Errors that can occur while running coqtop and capturing its output.
#[derive(thiserror::Error, Debug)]
pub enum CollectError {
    /// The binary was not found.
    #[error("coqtop binary not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when spawning.
    #[error("Permission denied running {0}")]
    PermissionDenied(PathBuf),

    /// Spawning failed for another reason.
    #[error("Failed to start {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while capturing output of a process that did start.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectError {
    /// Classify a spawn failure for `binary`.
    pub(crate) fn from_spawn(binary: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(binary.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(binary.to_path_buf()),
            _ => Self::Spawn {
                binary: binary.to_path_buf(),
                source: err,
            },
        }
    }

    /// Returns true if retrying the spawn may help.
    ///
    /// Only spawn failures qualify: once coqtop has run, a second run
    /// would not see anything different.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }
}
