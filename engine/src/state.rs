//! Durable last-sync state.
//!
//! A snapshot is what the last successful commit-mode sync looked like:
//! one manifest per side plus a small metadata record. It lives in a state
//! directory under the source root and is overwritten as a whole on every
//! successful sync. Status and the pre-sync drift check read it back;
//! absence means "never synced".

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::manifest::Manifest;

/// Name of the state directory, created under the source root.
pub const STATE_DIR_NAME: &str = ".sync-state";

const SOURCE_MANIFEST_FILE: &str = "source-manifest.sha";
const TARGET_MANIFEST_FILE: &str = "target-manifest.sha";
const META_FILE: &str = "last-sync.json";

/// Which side of the sync a stored manifest describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

/// Informational metadata written alongside the manifests.
///
/// Never consulted by reconciliation; the manifests alone decide what
/// changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncMeta {
    /// UTC timestamp of the sync, second precision
    pub timestamp: String,
    /// Best-effort source revision id, "unknown" when unavailable
    pub source_commit: String,
    /// Number of files in the synced file set
    pub file_count: usize,
}

/// Accessor for the persisted snapshot of the last sync.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// State store for a given source root (`<source>/.sync-state`).
    pub fn for_source(source_root: &Path) -> Self {
        StateStore {
            dir: source_root.join(STATE_DIR_NAME),
        }
    }

    /// True when a prior sync has recorded state.
    pub fn has_snapshot(&self) -> bool {
        self.dir.is_dir() && self.dir.join(META_FILE).is_file()
    }

    /// Recompute both side manifests and persist them with fresh metadata.
    ///
    /// The three artifacts are one logical unit but are written as
    /// independent files; there is no multi-file transaction. Last write
    /// wins, which is acceptable for a local single-operator tool.
    ///
    /// # Errors
    /// Returns `SyncError` if hashing or any write fails.
    pub fn save(
        &self,
        source_root: &Path,
        target: &Path,
        files: &[String],
        revision: &str,
    ) -> Result<(), SyncError> {
        fs::create_dir_all(&self.dir).map_err(|e| SyncError::DirectoryCreationFailed {
            path: self.dir.clone(),
            source: e,
        })?;

        let src_manifest = Manifest::generate(source_root, files)?;
        src_manifest.save(&self.dir.join(SOURCE_MANIFEST_FILE))?;

        let tgt_manifest = Manifest::generate(target, files)?;
        tgt_manifest.save(&self.dir.join(TARGET_MANIFEST_FILE))?;

        let meta = SyncMeta {
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            source_commit: revision.to_string(),
            file_count: files.len(),
        };
        self.write_meta(&meta)
    }

    /// Load the stored manifest for one side; empty when never synced.
    pub fn load_manifest(&self, side: Side) -> Result<Manifest, SyncError> {
        let file = match side {
            Side::Source => SOURCE_MANIFEST_FILE,
            Side::Target => TARGET_MANIFEST_FILE,
        };
        Manifest::load(&self.dir.join(file))
    }

    /// Load the last-sync metadata, or `None` when never synced.
    pub fn load_meta(&self) -> Result<Option<SyncMeta>, SyncError> {
        let path = self.dir.join(META_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| SyncError::ReadError {
            path: path.clone(),
            source: e,
        })?;
        // A corrupted metadata record degrades to "never synced" for the
        // informational header; the manifests are loaded separately.
        Ok(serde_json::from_str(&content).ok())
    }

    fn write_meta(&self, meta: &SyncMeta) -> Result<(), SyncError> {
        let path = self.dir.join(META_FILE);
        let json = serde_json::to_string_pretty(meta).map_err(|e| SyncError::WriteError {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        fs::write(&path, json + "\n").map_err(|e| SyncError::WriteError {
            path,
            source: e,
        })
    }
}
