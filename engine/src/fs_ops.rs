//! Low-level filesystem operations.
//!
//! This module provides:
//! - Recursive enumeration of regular files as forward-slash relative paths
//! - Copying files with metadata preservation
//! - Parent directory creation

use std::fs;
use std::io;
use std::path::Path;

use crate::error::SyncError;

/// Enumerate all regular files under `root`, returned as sorted
/// forward-slash relative paths prefixed with `prefix`.
///
/// Directories reached through symlinks are not descended, so the listing
/// cannot loop and never reports files outside the tree. Symlinks to
/// regular files are included, matching what a plain file-existence test
/// would report.
///
/// # Errors
/// Returns `SyncError::EnumerationFailed` if any directory cannot be read.
pub fn walk_relative_files(root: &Path, prefix: &str) -> Result<Vec<String>, SyncError> {
    let mut files = Vec::new();

    fn recurse(dir: &Path, rel: &str, files: &mut Vec<String>) -> Result<(), SyncError> {
        let entries = fs::read_dir(dir).map_err(|e| SyncError::EnumerationFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| SyncError::EnumerationFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;

            let name = entry.file_name();
            // Relative paths are plain UTF-8 strings; a non-UTF-8 name can
            // never match an allowlist entry or a manifest line, so such
            // entries are skipped and never touched.
            let name = match name.to_str() {
                Some(name) => name,
                None => continue,
            };
            let child_rel = if rel.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", rel, name)
            };

            // file_type() does not follow symlinks; metadata() does.
            let file_type = entry.file_type().map_err(|e| SyncError::EnumerationFailed {
                path: entry.path(),
                source: e,
            })?;

            if file_type.is_dir() {
                recurse(&entry.path(), &child_rel, files)?;
            } else if entry.path().is_file() {
                files.push(child_rel);
            }
        }
        Ok(())
    }

    recurse(root, prefix, &mut files)?;
    files.sort();
    Ok(files)
}

/// Copy a file from source to destination, preserving the modification
/// time and permission bits.
///
/// Creates intermediate destination directories as needed. The metadata
/// copies are best-effort; a file whose timestamp or mode could not be set
/// is still a successful copy.
///
/// # Errors
/// Returns `SyncError` if the copy itself fails.
pub fn copy_file_with_metadata(src: &Path, dst: &Path) -> Result<u64, SyncError> {
    ensure_parent_dir_exists(dst)?;

    let mut src_file = fs::File::open(src).map_err(|e| SyncError::ReadError {
        path: src.to_path_buf(),
        source: e,
    })?;

    let src_metadata = src_file.metadata().map_err(|e| SyncError::ReadError {
        path: src.to_path_buf(),
        source: e,
    })?;
    let src_mtime = src_metadata.modified().ok();

    let mut dst_file = fs::File::create(dst).map_err(|e| SyncError::WriteError {
        path: dst.to_path_buf(),
        source: e,
    })?;

    let bytes_copied = io::copy(&mut src_file, &mut dst_file).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            SyncError::WriteError {
                path: dst.to_path_buf(),
                source: e,
            }
        } else {
            SyncError::ReadError {
                path: src.to_path_buf(),
                source: e,
            }
        }
    })?;

    let _ = fs::set_permissions(dst, src_metadata.permissions());
    if let Some(mtime) = src_mtime {
        let _ = filetime::set_file_mtime(dst, filetime::FileTime::from_system_time(mtime));
    }

    Ok(bytes_copied)
}

/// Ensure the parent directory of a path exists, creating it if necessary.
pub fn ensure_parent_dir_exists(path: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }

        match fs::metadata(parent) {
            Ok(metadata) => {
                if metadata.is_dir() {
                    Ok(())
                } else {
                    Err(SyncError::DirectoryCreationFailed {
                        path: parent.to_path_buf(),
                        source: io::Error::new(
                            io::ErrorKind::InvalidInput,
                            "Parent path exists but is not a directory",
                        ),
                    })
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(parent).map_err(|e| SyncError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
                Ok(())
            }
            Err(e) => Err(SyncError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source: e,
            }),
        }
    } else {
        Ok(())
    }
}
