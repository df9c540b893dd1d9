//! `accounts config` – show the configuration source and effective values.

use crate::cli::ConfigSource;
use accounts_core::config::ApiConfig;
use anyhow::Result;

pub fn run_config(cfg: &ApiConfig, source: &ConfigSource) -> Result<()> {
    match source {
        ConfigSource::Environment => println!("# source: environment"),
        ConfigSource::File(path) => println!("# source: {}", path.display()),
    }
    println!("# resource url: {}", cfg.account_url()?);
    let effective = ApiConfig {
        retry: Some(cfg.retry_policy().into()),
        pool: Some(cfg.pool_limits()),
        ..cfg.clone()
    };
    print!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}
