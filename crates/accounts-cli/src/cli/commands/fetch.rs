//! `accounts fetch <id>` – print one account as JSON.

use super::{accounts, blocking};
use accounts_core::config::ApiConfig;
use anyhow::Result;

pub async fn run_fetch(cfg: ApiConfig, id: String) -> Result<()> {
    let account = blocking(move || Ok(accounts(&cfg)?.fetch(&id)?)).await?;
    println!("{}", serde_json::to_string_pretty(&account)?);
    Ok(())
}
