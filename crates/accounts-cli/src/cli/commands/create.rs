//! `accounts create <file>` – POST a JSON document and print the created account.

use super::{accounts, blocking};
use accounts_core::config::ApiConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub(crate) fn read_document(path: &Path) -> Result<Value> {
    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parse {} as JSON", path.display()))
}

pub async fn run_create(cfg: ApiConfig, path: &Path) -> Result<()> {
    let doc = read_document(path)?;
    let created = blocking(move || Ok(accounts(&cfg)?.create(&doc)?)).await?;
    println!("{}", serde_json::to_string_pretty(&created)?);
    Ok(())
}
