//! Sync execution and live tree comparison.
//!
//! Preview and diff both compare live source against live target; the
//! stored snapshot is deliberately not consulted there. Only the commit
//! path's drift check and the status command read the snapshot. Keeping
//! the two code paths separate is intentional, not an oversight.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::checksums::compute_file_digest;
use crate::error::SyncError;
use crate::fileset::FileSelection;
use crate::fs_ops;
use crate::state::{Side, StateStore};

/// What a commit-mode sync would do to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// Absent in the target; would be copied fresh
    Create,
    /// Present in the target with a different digest; would be overwritten
    Update,
}

/// Live comparison result for one tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffClass {
    SourceOnly,
    TargetOnly,
    Modified,
    Identical,
}

/// Counts emitted after a commit-mode sync.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    pub copied: usize,
    pub unchanged: usize,
    pub deleted: usize,
    pub total: usize,
}

/// Receives per-file notifications during a commit-mode sync.
///
/// Decouples the executor from any output technology; the CLI implements
/// this for colored stdout reporting.
pub trait SyncObserver {
    /// Called after a file was copied into the target.
    fn file_copied(&self, rel: &str);

    /// Called after a stale target file was deleted by the sweep.
    fn file_deleted(&self, rel: &str);
}

/// Observer that ignores all notifications.
pub struct NullObserver;

impl SyncObserver for NullObserver {
    fn file_copied(&self, _rel: &str) {}
    fn file_deleted(&self, _rel: &str) {}
}

/// Classify what a commit would do, without touching the filesystem.
///
/// Identical files are omitted from the result. Lives entirely in
/// live-source-vs-live-target space; no snapshot is involved.
pub fn preview(
    source_root: &Path,
    target: &Path,
    files: &[String],
) -> Result<Vec<(String, PlanAction)>, SyncError> {
    let mut plan = Vec::new();
    for rel in files {
        let src = source_root.join(rel);
        let dst = target.join(rel);
        if !dst.is_file() {
            plan.push((rel.clone(), PlanAction::Create));
        } else if compute_file_digest(&src)? != compute_file_digest(&dst)? {
            plan.push((rel.clone(), PlanAction::Update));
        }
    }
    Ok(plan)
}

/// Tracked files whose current target content differs from what the
/// snapshot recorded at last sync.
///
/// Files with no recorded digest are not drift, and with no prior snapshot
/// the stored manifest is empty, so nothing is reported. The commit path
/// must not overwrite these without operator confirmation.
pub fn target_drift(
    state: &StateStore,
    target: &Path,
    files: &[String],
) -> Result<Vec<String>, SyncError> {
    let old_target = state.load_manifest(Side::Target)?;
    let mut drifted = Vec::new();

    for rel in files {
        let full = target.join(rel);
        if full.is_file() {
            if let Some(old) = old_target.digest(rel) {
                if old != compute_file_digest(&full)? {
                    drifted.push(rel.clone());
                }
            }
        }
    }
    Ok(drifted)
}

/// Execute a commit-mode sync: copy changed files, then delete target
/// files under allowlisted directories that no longer exist in the source
/// file set.
///
/// Does not touch the snapshot; the caller persists state after a
/// successful run. Rerunning is idempotent because identical files are
/// skipped.
///
/// # Errors
/// Returns `SyncError::EmptyFileSet` for an empty file set (an empty sync
/// is never valid), or an I/O error from hashing, copying, or deleting.
pub fn apply(
    source_root: &Path,
    target: &Path,
    files: &[String],
    selection: &FileSelection,
    observer: &dyn SyncObserver,
) -> Result<SyncOutcome, SyncError> {
    if files.is_empty() {
        return Err(SyncError::EmptyFileSet);
    }

    let mut outcome = SyncOutcome {
        total: files.len(),
        ..SyncOutcome::default()
    };

    for rel in files {
        let src = source_root.join(rel);
        let dst = target.join(rel);

        if dst.is_file() && compute_file_digest(&src)? == compute_file_digest(&dst)? {
            outcome.unchanged += 1;
            continue;
        }

        fs_ops::copy_file_with_metadata(&src, &dst)?;
        observer.file_copied(rel);
        outcome.copied += 1;
    }

    let source_set: BTreeSet<&str> = files.iter().map(String::as_str).collect();
    for rel in sweep_target_extras(target, selection, &source_set)? {
        let full = target.join(&rel);
        fs::remove_file(&full).map_err(|e| SyncError::DeleteError {
            path: full,
            source: e,
        })?;
        observer.file_deleted(&rel);
        outcome.deleted += 1;
    }

    Ok(outcome)
}

/// Compare live source against live target for every tracked file, plus a
/// non-mutating sweep for target-side extras under allowlisted
/// directories.
///
/// Returns `(per-file classes, extra target-only paths)`. The extras use
/// the same detection logic as the deletion sweep.
pub fn compare_trees(
    source_root: &Path,
    target: &Path,
    files: &[String],
    selection: &FileSelection,
) -> Result<(Vec<(String, DiffClass)>, Vec<String>), SyncError> {
    let mut entries = Vec::with_capacity(files.len());

    for rel in files {
        let src = source_root.join(rel);
        let dst = target.join(rel);

        let class = match (src.is_file(), dst.is_file()) {
            (true, false) => DiffClass::SourceOnly,
            (false, true) => DiffClass::TargetOnly,
            (true, true) => {
                if compute_file_digest(&src)? != compute_file_digest(&dst)? {
                    DiffClass::Modified
                } else {
                    DiffClass::Identical
                }
            }
            // Resolved against the source, so this only happens when a
            // file vanishes mid-run; nothing to report either way.
            (false, false) => continue,
        };
        entries.push((rel.clone(), class));
    }

    let source_set: BTreeSet<&str> = files.iter().map(String::as_str).collect();
    let extras = sweep_target_extras(target, selection, &source_set)?;

    Ok((entries, extras))
}

/// Files under the target's allowlisted directories with no counterpart in
/// the source file set. Shared by the deletion sweep and the diff report.
fn sweep_target_extras(
    target: &Path,
    selection: &FileSelection,
    source_set: &BTreeSet<&str>,
) -> Result<Vec<String>, SyncError> {
    let mut extras = Vec::new();
    for dir in selection.dir_entries() {
        let tgt_dir = target.join(dir);
        if tgt_dir.is_dir() {
            for rel in fs_ops::walk_relative_files(&tgt_dir, dir)? {
                if !source_set.contains(rel.as_str()) {
                    extras.push(rel);
                }
            }
        }
    }
    Ok(extras)
}
