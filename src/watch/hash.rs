// src/watch/hash.rs

use std::io::Read;
use std::path::Path;

use blake3::Hasher;

use crate::fs::FileSystem;

/// Compute the blake3 hash of a single file, hex-encoded.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> std::io::Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs.open_read(path)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
