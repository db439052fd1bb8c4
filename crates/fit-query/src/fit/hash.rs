//! Content fingerprints used to skip files that were already imported

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Result;

/// Read buffer size for hashing files
const CHUNK_SIZE: usize = 64 * 1024;

/// SHA-256 of `bytes` as 64 lowercase hex characters
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Fingerprint the full content of the file at `path`
pub fn fingerprint_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let hash = format!("{:x}", hasher.finalize());
    tracing::debug!(path = %path.display(), hash = %hash, "fingerprinted file");
    Ok(hash)
}
