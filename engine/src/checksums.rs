//! Content hashing.
//!
//! Every identity decision in the tool rests on SHA-256 digests: two files
//! are "identical" iff their digests are equal, with no byte-level fallback
//! comparison. Files are streamed in fixed-size chunks so large bundled
//! assets never have to fit in memory.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::SyncError;

/// Chunk size for streaming file reads.
const CHUNK_SIZE: usize = 8192;

/// Compute the SHA-256 digest of a file, returned as lowercase hex.
///
/// # Errors
/// Returns `SyncError::ReadError` if the file cannot be opened or read.
/// There is no partial or best-effort digest; any read failure aborts.
pub fn compute_file_digest(path: &Path) -> Result<String, SyncError> {
    let mut file = File::open(path).map_err(|e| SyncError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) => {
                return Err(SyncError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}
