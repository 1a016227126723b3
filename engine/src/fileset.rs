//! File-set resolution.
//!
//! The set of trackable files is defined by a fixed allowlist, not a
//! pattern engine. Entries ending in `/` are directories expanded
//! recursively; all other entries name exact files at the root. An ignore
//! list of exact relative paths carves generated files out of otherwise
//! allowlisted directories.
//!
//! Resolution is recomputed from the live directory listing on every
//! invocation; the file set is never persisted. Output ordering is strictly
//! lexicographic, which manifest persistence and diff/status output depend
//! on.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::SyncError;
use crate::fs_ops;

/// One allowlist entry: a directory to expand or an exact file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowEntry {
    /// Directory, expanded recursively (regular files only)
    Dir(String),
    /// Exact file, included only if it exists as a regular file
    File(String),
}

/// A fixed selection of paths to track: the allowlist plus exclusions.
#[derive(Debug, Clone)]
pub struct FileSelection {
    entries: Vec<AllowEntry>,
    ignore: BTreeSet<String>,
}

impl FileSelection {
    /// Build a selection from string entries.
    ///
    /// Entries with a trailing `/` become directory entries (the slash is
    /// stripped); everything else is an exact file entry. Ignore entries
    /// are exact relative paths, matched by string equality.
    pub fn new(entries: &[&str], ignore: &[&str]) -> Self {
        let entries = entries
            .iter()
            .map(|e| match e.strip_suffix('/') {
                Some(dir) => AllowEntry::Dir(dir.to_string()),
                None => AllowEntry::File(e.to_string()),
            })
            .collect();
        let ignore = ignore.iter().map(|s| s.to_string()).collect();
        FileSelection { entries, ignore }
    }

    /// Directory entries of the allowlist, as relative path strings.
    ///
    /// The sync executor's deletion sweep and the diff command's
    /// target-only sweep both walk exactly these directories.
    pub fn dir_entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            AllowEntry::Dir(d) => Some(d.as_str()),
            AllowEntry::File(_) => None,
        })
    }

    /// Whether a relative path is excluded by the ignore list.
    pub fn is_ignored(&self, rel: &str) -> bool {
        self.ignore.contains(rel)
    }

    /// Expand the allowlist against `root` into the sorted, deduplicated
    /// list of relative paths that currently exist there.
    ///
    /// Only regular files are included. Missing allowlist entries are
    /// silently omitted; whether an empty result is an error is up to the
    /// caller.
    ///
    /// # Errors
    /// Returns `SyncError::EnumerationFailed` if an existing allowlisted
    /// directory cannot be read.
    pub fn resolve(&self, root: &Path) -> Result<Vec<String>, SyncError> {
        // BTreeSet both sorts and deduplicates overlapping entries.
        let mut files = BTreeSet::new();

        for entry in &self.entries {
            match entry {
                AllowEntry::Dir(dir) => {
                    let dir_path = root.join(dir);
                    if dir_path.is_dir() {
                        for rel in fs_ops::walk_relative_files(&dir_path, dir)? {
                            if !self.is_ignored(&rel) {
                                files.insert(rel);
                            }
                        }
                    }
                }
                AllowEntry::File(name) => {
                    if root.join(name).is_file() && !self.is_ignored(name) {
                        files.insert(name.clone());
                    }
                }
            }
        }

        Ok(files.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn selection() -> FileSelection {
        FileSelection::new(&["src/", "package.json", "LICENSE"], &["src/version.ts"])
    }

    fn populate(root: &Path) {
        fs::create_dir_all(root.join("src/editor")).expect("Failed to create dirs");
        fs::write(root.join("src/index.ts"), "index").expect("Failed to write");
        fs::write(root.join("src/version.ts"), "generated").expect("Failed to write");
        fs::write(root.join("src/editor/main.ts"), "editor").expect("Failed to write");
        fs::write(root.join("package.json"), "{}").expect("Failed to write");
        fs::write(root.join("untracked.txt"), "not in allowlist").expect("Failed to write");
    }

    #[test]
    fn test_resolve_expands_dirs_and_files() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        populate(temp_dir.path());

        let files = selection().resolve(temp_dir.path()).expect("Failed to resolve");
        assert_eq!(
            files,
            vec![
                "package.json".to_string(),
                "src/editor/main.ts".to_string(),
                "src/index.ts".to_string(),
            ]
        );
    }

    #[test]
    fn test_ignore_list_excludes_exact_paths() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        populate(temp_dir.path());

        let files = selection().resolve(temp_dir.path()).expect("Failed to resolve");
        assert!(!files.contains(&"src/version.ts".to_string()));
    }

    #[test]
    fn test_missing_entries_are_omitted() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        populate(temp_dir.path());

        // LICENSE is allowlisted but does not exist on disk
        let files = selection().resolve(temp_dir.path()).expect("Failed to resolve");
        assert!(!files.contains(&"LICENSE".to_string()));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        populate(temp_dir.path());

        let sel = selection();
        let first = sel.resolve(temp_dir.path()).expect("Failed to resolve");
        let second = sel.resolve(temp_dir.path()).expect("Failed to resolve");
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(first, sorted, "Output must be lexicographically sorted");
    }

    #[test]
    fn test_empty_root_resolves_empty() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let files = selection().resolve(temp_dir.path()).expect("Failed to resolve");
        assert!(files.is_empty());
    }

    #[test]
    fn test_dir_entries() {
        let sel = selection();
        let dirs: Vec<&str> = sel.dir_entries().collect();
        assert_eq!(dirs, vec!["src"]);
    }
}
