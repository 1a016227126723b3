//! Manifest generation and persistence.
//!
//! A manifest maps relative file paths to SHA-256 digests, capturing the
//! content state of one root at one point in time. The persisted form is
//! one line per entry, `"<digest>  <path>"` with a two-space separator,
//! matching traditional checksum-list tooling.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::checksums::compute_file_digest;
use crate::error::SyncError;

/// Separator between digest and path in the persisted format.
const SEPARATOR: &str = "  ";

/// A mapping from relative path to content digest.
///
/// Backed by a `BTreeMap` so iteration and persistence are always in
/// lexicographic path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Compute a manifest for `files` under `root`.
    ///
    /// Files that do not exist as regular files under the root are omitted
    /// rather than recorded with a placeholder digest.
    ///
    /// # Errors
    /// Returns `SyncError::ReadError` if an existing file cannot be hashed.
    pub fn generate(root: &Path, files: &[String]) -> Result<Manifest, SyncError> {
        let mut entries = BTreeMap::new();
        for rel in files {
            let full = root.join(rel);
            if full.is_file() {
                entries.insert(rel.clone(), compute_file_digest(&full)?);
            }
        }
        Ok(Manifest { entries })
    }

    /// Load a manifest from the checksum-list format.
    ///
    /// Lines without the two-space separator (blank lines, corrupted rows)
    /// are skipped rather than failing the load. A missing file yields an
    /// empty manifest: "no prior snapshot" is a valid first-run state.
    pub fn load(path: &Path) -> Result<Manifest, SyncError> {
        let mut entries = BTreeMap::new();
        if path.is_file() {
            let content = fs::read_to_string(path).map_err(|e| SyncError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
            for line in content.lines() {
                if let Some((digest, rel)) = line.split_once(SEPARATOR) {
                    entries.insert(rel.to_string(), digest.to_string());
                }
            }
        }
        Ok(Manifest { entries })
    }

    /// Persist as one sorted `"<digest>  <path>"` line per entry.
    pub fn save(&self, path: &Path) -> Result<(), SyncError> {
        let mut out = String::new();
        for (rel, digest) in &self.entries {
            out.push_str(digest);
            out.push_str(SEPARATOR);
            out.push_str(rel);
            out.push('\n');
        }

        let mut file = fs::File::create(path).map_err(|e| SyncError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        file.write_all(out.as_bytes())
            .map_err(|e| SyncError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })
    }

    /// Digest recorded for a relative path, if any.
    pub fn digest(&self, rel: &str) -> Option<&str> {
        self.entries.get(rel).map(String::as_str)
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no files are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_omits_missing_files() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("a.txt"), "alpha").expect("Failed to write");

        let files = vec!["a.txt".to_string(), "gone.txt".to_string()];
        let manifest = Manifest::generate(temp_dir.path(), &files).expect("Failed to generate");

        assert_eq!(manifest.len(), 1);
        assert!(manifest.digest("a.txt").is_some());
        assert!(manifest.digest("gone.txt").is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir(temp_dir.path().join("src")).expect("Failed to create dir");
        fs::write(temp_dir.path().join("a.txt"), "alpha").expect("Failed to write");
        fs::write(temp_dir.path().join("src/b.txt"), "beta").expect("Failed to write");

        let files = vec!["a.txt".to_string(), "src/b.txt".to_string()];
        let manifest = Manifest::generate(temp_dir.path(), &files).expect("Failed to generate");

        let path = temp_dir.path().join("manifest.sha");
        manifest.save(&path).expect("Failed to save");
        let loaded = Manifest::load(&path).expect("Failed to load");

        assert_eq!(manifest, loaded);
    }

    #[test]
    fn test_saved_format_is_checksum_list() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("hello.txt"), "hello").expect("Failed to write");

        let files = vec!["hello.txt".to_string()];
        let manifest = Manifest::generate(temp_dir.path(), &files).expect("Failed to generate");

        let path = temp_dir.path().join("manifest.sha");
        manifest.save(&path).expect("Failed to save");

        let content = fs::read_to_string(&path).expect("Failed to read");
        assert_eq!(
            content,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824  hello.txt\n"
        );
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("manifest.sha");
        fs::write(
            &path,
            "abc123  good.txt\nnot-a-manifest-line\n\ndef456  also good.txt\n",
        )
        .expect("Failed to write");

        let manifest = Manifest::load(&path).expect("Failed to load");
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.digest("good.txt"), Some("abc123"));
        assert_eq!(manifest.digest("also good.txt"), Some("def456"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let manifest =
            Manifest::load(&temp_dir.path().join("never-written.sha")).expect("Failed to load");
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_paths_with_spaces_survive_round_trip() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("has space.txt"), "x").expect("Failed to write");

        let files = vec!["has space.txt".to_string()];
        let manifest = Manifest::generate(temp_dir.path(), &files).expect("Failed to generate");

        let path = temp_dir.path().join("manifest.sha");
        manifest.save(&path).expect("Failed to save");
        let loaded = Manifest::load(&path).expect("Failed to load");
        assert_eq!(loaded.digest("has space.txt"), manifest.digest("has space.txt"));
    }
}
