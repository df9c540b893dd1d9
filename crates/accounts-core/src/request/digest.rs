//! Body digest for the `Digest` request header.
//!
//! The value is `sha-256=<base64(SHA-256(body))>` over the exact bytes sent.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DIGEST_PREFIX: &str = "sha-256=";
const BUF_SIZE: usize = 64 * 1024;

/// Digest header value for `bytes`. Pure: identical input yields identical output.
pub fn digest(bytes: &[u8]) -> String {
    format_digest(&Sha256::digest(bytes))
}

/// Digest header value for the contents of a file, read in chunks.
pub fn digest_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format_digest(&hasher.finalize()))
}

fn format_digest(hash: &[u8]) -> String {
    format!("{}{}", DIGEST_PREFIX, STANDARD.encode(hash))
}
