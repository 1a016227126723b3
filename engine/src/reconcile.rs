//! Three-way reconciliation against the last-sync snapshot.
//!
//! Each tracked file's live digest on each side is compared against what
//! the snapshot recorded for that side. A side counts as modified when the
//! file exists there and either no prior digest was recorded (new files
//! surface rather than hide) or the recorded digest differs. Files absent
//! on a side contribute no signal for that side.

use std::path::Path;

use crate::checksums::compute_file_digest;
use crate::error::SyncError;
use crate::manifest::Manifest;

/// Classification of one tracked file relative to the last sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Neither side changed since the snapshot
    Unchanged,
    /// Only the source side changed
    SourceChanged,
    /// Only the target side changed
    TargetChanged,
    /// Both sides changed
    Conflict,
}

/// Per-bucket listing of every file that changed since the last sync.
///
/// Buckets preserve the file-set ordering, so output is deterministic.
#[derive(Debug, Default)]
pub struct StatusReport {
    pub source_changed: Vec<String>,
    pub target_changed: Vec<String>,
    pub conflicts: Vec<String>,
}

impl StatusReport {
    /// True when nothing changed on either side.
    pub fn is_clean(&self) -> bool {
        self.source_changed.is_empty()
            && self.target_changed.is_empty()
            && self.conflicts.is_empty()
    }
}

/// Whether one side counts as modified, given the live file (if present)
/// and the digest the snapshot recorded (if any).
fn side_modified(
    path: &Path,
    stored_digest: Option<&str>,
) -> Result<bool, SyncError> {
    if !path.is_file() {
        // Absence is not "modified"; the side is simply not evaluated.
        return Ok(false);
    }
    let current = compute_file_digest(path)?;
    Ok(match stored_digest {
        Some(stored) => stored != current,
        None => true, // No prior digest: treat as new, surface it
    })
}

/// Classify one file. Conflict wins over single-side changes.
pub fn classify_file(
    source_path: &Path,
    target_path: &Path,
    stored_source: Option<&str>,
    stored_target: Option<&str>,
) -> Result<FileStatus, SyncError> {
    let src_modified = side_modified(source_path, stored_source)?;
    let tgt_modified = side_modified(target_path, stored_target)?;

    Ok(match (src_modified, tgt_modified) {
        (true, true) => FileStatus::Conflict,
        (true, false) => FileStatus::SourceChanged,
        (false, true) => FileStatus::TargetChanged,
        (false, false) => FileStatus::Unchanged,
    })
}

/// Reconcile every tracked file against the stored snapshot manifests.
///
/// # Errors
/// Returns `SyncError::ReadError` if an existing file cannot be hashed.
pub fn reconcile(
    files: &[String],
    source_root: &Path,
    target: &Path,
    old_source: &Manifest,
    old_target: &Manifest,
) -> Result<StatusReport, SyncError> {
    let mut report = StatusReport::default();

    for rel in files {
        let status = classify_file(
            &source_root.join(rel),
            &target.join(rel),
            old_source.digest(rel),
            old_target.digest(rel),
        )?;

        match status {
            FileStatus::Unchanged => {}
            FileStatus::SourceChanged => report.source_changed.push(rel.clone()),
            FileStatus::TargetChanged => report.target_changed.push(rel.clone()),
            FileStatus::Conflict => report.conflicts.push(rel.clone()),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Rig {
        source: tempfile::TempDir,
        target: tempfile::TempDir,
        files: Vec<String>,
        old_source: Manifest,
        old_target: Manifest,
    }

    /// Source and target each hold `a.txt`/`b.txt`, snapshot matching both.
    fn synced_rig() -> Rig {
        let source = tempfile::tempdir().expect("Failed to create temp dir");
        let target = tempfile::tempdir().expect("Failed to create temp dir");
        let files = vec!["a.txt".to_string(), "b.txt".to_string()];

        for rel in &files {
            fs::write(source.path().join(rel), format!("{rel} content"))
                .expect("Failed to write");
            fs::write(target.path().join(rel), format!("{rel} content"))
                .expect("Failed to write");
        }

        let old_source = Manifest::generate(source.path(), &files).expect("Failed to generate");
        let old_target = Manifest::generate(target.path(), &files).expect("Failed to generate");

        Rig {
            source,
            target,
            files,
            old_source,
            old_target,
        }
    }

    fn run(rig: &Rig) -> StatusReport {
        reconcile(
            &rig.files,
            rig.source.path(),
            rig.target.path(),
            &rig.old_source,
            &rig.old_target,
        )
        .expect("Failed to reconcile")
    }

    #[test]
    fn test_clean_tree_reports_no_changes() {
        let rig = synced_rig();
        let report = run(&rig);
        assert!(report.is_clean());
    }

    #[test]
    fn test_target_edit_is_target_changed_only() {
        let rig = synced_rig();
        fs::write(rig.target.path().join("a.txt"), "edited downstream")
            .expect("Failed to write");

        let report = run(&rig);
        assert_eq!(report.target_changed, vec!["a.txt".to_string()]);
        assert!(report.source_changed.is_empty());
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn test_source_edit_is_source_changed_only() {
        let rig = synced_rig();
        fs::write(rig.source.path().join("b.txt"), "upstream change").expect("Failed to write");

        let report = run(&rig);
        assert_eq!(report.source_changed, vec!["b.txt".to_string()]);
        assert!(report.target_changed.is_empty());
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn test_both_sides_edited_is_conflict() {
        let rig = synced_rig();
        fs::write(rig.source.path().join("a.txt"), "upstream").expect("Failed to write");
        fs::write(rig.target.path().join("a.txt"), "downstream").expect("Failed to write");

        let report = run(&rig);
        assert_eq!(report.conflicts, vec!["a.txt".to_string()]);
        assert!(report.source_changed.is_empty());
        assert!(report.target_changed.is_empty());
    }

    #[test]
    fn test_file_without_prior_digest_counts_as_modified() {
        let mut rig = synced_rig();
        rig.files.push("new.txt".to_string());
        fs::write(rig.source.path().join("new.txt"), "introduced").expect("Failed to write");

        let report = run(&rig);
        assert_eq!(report.source_changed, vec!["new.txt".to_string()]);
    }

    #[test]
    fn test_absent_file_contributes_no_signal() {
        let rig = synced_rig();
        fs::remove_file(rig.target.path().join("b.txt")).expect("Failed to remove");

        // Deleted on target: absent, so not "modified" there
        let report = run(&rig);
        assert!(report.is_clean());
    }
}
