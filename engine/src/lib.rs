//! # plugin-sync engine
//!
//! One-directional file synchronization library: mirror an allowlisted
//! subset of a plugin source tree into a downstream target directory,
//! track per-file SHA-256 digests, and detect drift on either side.
//!
//! The engine is headless; terminal output, prompts, and argument parsing
//! live in the CLI crate. Core pieces:
//!
//! - **fileset**: expand the fixed allowlist into a sorted list of
//!   relative paths that exist under a root
//! - **checksums**: streamed SHA-256 content digests
//! - **manifest**: path -> digest mapping with checksum-list persistence
//! - **state**: the durable snapshot of the last successful sync
//! - **reconcile**: classify files against the snapshot
//!   (unchanged / source-changed / target-changed / conflict)
//! - **sync**: preview, drift check, and the copy/skip/delete executor
//! - **fs_ops**: file walking and metadata-preserving copies
//!
//! ## Basic usage
//!
//! ```no_run
//! use std::path::Path;
//! use engine::{FileSelection, NullObserver, StateStore};
//!
//! # fn main() -> Result<(), engine::SyncError> {
//! let selection = FileSelection::new(&["src/", "package.json"], &[]);
//! let source = Path::new("/plugin/source");
//! let target = Path::new("/enterprise/target");
//!
//! let files = selection.resolve(source)?;
//! let outcome = engine::sync::apply(source, target, &files, &selection, &NullObserver)?;
//! println!("{} copied, {} deleted", outcome.copied, outcome.deleted);
//!
//! StateStore::for_source(source).save(source, target, &files, "unknown")?;
//! # Ok(())
//! # }
//! ```

pub mod checksums;
pub mod error;
pub mod fileset;
pub mod fs_ops;
pub mod manifest;
pub mod reconcile;
pub mod state;
pub mod sync;

pub use checksums::compute_file_digest;
pub use error::SyncError;
pub use fileset::{AllowEntry, FileSelection};
pub use manifest::Manifest;
pub use reconcile::{reconcile, FileStatus, StatusReport};
pub use state::{Side, StateStore, SyncMeta, STATE_DIR_NAME};
pub use sync::{DiffClass, NullObserver, PlanAction, SyncObserver, SyncOutcome};
