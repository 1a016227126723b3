//! Error types for the sync engine.
//!
//! The primary error type is `SyncError`, which represents conditions that
//! prevent a command from completing. Best-effort lookups (revision id,
//! terminal detection) never surface here; they degrade to fallback values
//! at the call site.

use std::error::Error;
use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

/// Errors that can occur while resolving, hashing, or syncing files.
///
/// I/O failures carry the path they occurred on so the operator knows what
/// to fix before rerunning. Reruns are safe: unchanged files are skipped.
#[derive(Debug)]
pub enum SyncError {
    /// Target directory does not exist (and creation was not authorized)
    TargetNotFound { path: PathBuf },

    /// Failed to read a file (hashing, copying, or diffing)
    ReadError { path: PathBuf, source: io::Error },

    /// Failed to write a file (copying or state persistence)
    WriteError { path: PathBuf, source: io::Error },

    /// Failed to delete a target file during the deletion sweep
    DeleteError { path: PathBuf, source: io::Error },

    /// Failed to enumerate a directory
    EnumerationFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// The allowlist resolved to zero files (likely misconfiguration)
    EmptyFileSet,

    /// No prior sync snapshot exists where one is required
    NoSyncState,
}

impl Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound { path } => {
                write!(f, "Target directory does not exist: {}", path.display())
            }
            Self::ReadError { path, .. } => {
                write!(f, "Failed to read file: {}", path.display())
            }
            Self::WriteError { path, .. } => {
                write!(f, "Failed to write file: {}", path.display())
            }
            Self::DeleteError { path, .. } => {
                write!(f, "Failed to delete file: {}", path.display())
            }
            Self::EnumerationFailed { path, .. } => {
                write!(f, "Failed to enumerate directory: {}", path.display())
            }
            Self::DirectoryCreationFailed { path, .. } => {
                write!(f, "Failed to create directory: {}", path.display())
            }
            Self::EmptyFileSet => {
                write!(f, "No files matched the allowlist")
            }
            Self::NoSyncState => {
                write!(f, "No sync state found. Run a commit-mode sync first")
            }
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadError { source, .. }
            | Self::WriteError { source, .. }
            | Self::DeleteError { source, .. }
            | Self::EnumerationFailed { source, .. }
            | Self::DirectoryCreationFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}
