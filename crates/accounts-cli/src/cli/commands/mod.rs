//! CLI command handlers. Each command is in its own file.

mod config;
mod create;
mod delete;
mod digest;
mod fetch;

pub use config::run_config;
pub use create::run_create;
pub use delete::run_delete;
pub use digest::run_digest;
pub use fetch::run_fetch;

use accounts_core::account::Accounts;
use accounts_core::client::Client;
use accounts_core::config::ApiConfig;
use accounts_core::transport::CurlTransport;
use anyhow::{Context, Result};

/// Run blocking core work (libcurl, backoff sleeps) off the async runtime.
async fn blocking<F, T>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .context("blocking task failed")?
}

fn accounts(cfg: &ApiConfig) -> Result<Accounts<CurlTransport>> {
    let client = Client::from_config(cfg)?;
    tracing::debug!(url = %client.resource_url(), "accounts client ready");
    Ok(Accounts::new(client))
}
