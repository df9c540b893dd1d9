//! `accounts delete <id> --version <n>`.

use super::{accounts, blocking};
use accounts_core::config::ApiConfig;
use anyhow::Result;

pub async fn run_delete(cfg: ApiConfig, id: String, version: u64) -> Result<()> {
    let shown = id.clone();
    blocking(move || Ok(accounts(&cfg)?.delete(&id, version)?)).await?;
    println!("Deleted account {} (version {})", shown, version);
    Ok(())
}
