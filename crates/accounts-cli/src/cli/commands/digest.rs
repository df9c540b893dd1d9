//! Digest command: the `Digest` header value a request body would carry.

use accounts_core::request;
use anyhow::Result;
use std::path::Path;

pub async fn run_digest(path: &Path) -> Result<()> {
    let digest = request::digest_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
