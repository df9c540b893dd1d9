use crate::retry::RetryPolicy;
use crate::transport::PoolLimits;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const BASE_URL_ENV_KEY: &str = "BASE_URL";
pub const ACCOUNT_PATH_ENV_KEY: &str = "ACCOUNT_PATH";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_ACCOUNT_PATH: &str = "/v1/organisation/accounts";

fn default_timeout_secs() -> u64 {
    100
}

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Backoff base in milliseconds.
    pub base_delay_ms: u64,
    pub exponential_base: f64,
    /// Upper bound of the random delay added to each backoff.
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(RetryPolicy::default())
    }
}

impl From<RetryPolicy> for RetryConfig {
    fn from(p: RetryPolicy) -> Self {
        Self {
            max_retries: p.max_retries,
            base_delay_ms: u64::try_from(p.base_delay.as_millis()).unwrap_or(u64::MAX),
            exponential_base: p.exponential_base,
            max_jitter_ms: u64::try_from(p.max_jitter.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(c: &RetryConfig) -> Self {
        Self {
            max_retries: c.max_retries,
            base_delay: Duration::from_millis(c.base_delay_ms),
            exponential_base: c.exponential_base,
            max_jitter: Duration::from_millis(c.max_jitter_ms),
        }
    }
}

/// API location and client tuning, loaded from `~/.config/accounts/config.toml`,
/// from the environment, or built from literal values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Absolute base URL, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Path of the accounts collection under `base_url`.
    pub account_path: String,
    /// Per-attempt timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional connection pool limits; if missing, 100 each.
    #[serde(default)]
    pub pool: Option<PoolLimits>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            account_path: DEFAULT_ACCOUNT_PATH.to_string(),
            timeout_secs: default_timeout_secs(),
            retry: None,
            pool: None,
        }
    }
}

impl ApiConfig {
    /// Config from literal values. The base URL must be absolute with a host.
    pub fn from_values(base_url: &str, account_path: &str) -> Result<Self> {
        parse_base_url(base_url)?;
        Ok(Self {
            base_url: base_url.to_string(),
            account_path: account_path.to_string(),
            ..Self::default()
        })
    }

    /// Config from `BASE_URL` and `ACCOUNT_PATH`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(BASE_URL_ENV_KEY).ok_or_else(|| env_error(BASE_URL_ENV_KEY))?;
        let account_path =
            lookup(ACCOUNT_PATH_ENV_KEY).ok_or_else(|| env_error(ACCOUNT_PATH_ENV_KEY))?;
        Self::from_values(&base_url, &account_path)
    }

    pub fn base_url(&self) -> Result<Url> {
        parse_base_url(&self.base_url)
    }

    /// `base_url` with `account_path` appended segment by segment.
    pub fn account_url(&self) -> Result<Url> {
        let mut url = self.base_url()?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("base url cannot carry a path: {}", self.base_url))?;
            segments.pop_if_empty();
            for segment in self.account_path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default()
    }

    pub fn pool_limits(&self) -> PoolLimits {
        self.pool.unwrap_or_default()
    }
}

fn env_error(key: &str) -> anyhow::Error {
    anyhow!("failed to get {} from environment variables", key)
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| anyhow!("failed parsing base url: {}", e))?;
    if !url.has_host() {
        bail!("failed parsing base url: {} has no host", raw);
    }
    Ok(url)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("accounts")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ApiConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<ApiConfig> {
    if !path.exists() {
        let default_cfg = ApiConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(path)
}

/// Load configuration from an existing file.
pub fn load_from(path: &Path) -> Result<ApiConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ApiConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.base_url()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_values() {
        let cfg = ApiConfig::default();
        assert_eq!(cfg.timeout_secs, 100);
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.retry_policy(), RetryPolicy::default());
        assert_eq!(cfg.pool_limits(), PoolLimits::default());
        assert_eq!(cfg.pool_limits().max_connections_per_host, 100);
    }

    #[test]
    fn from_values_accepts_absolute_url() {
        let cfg = ApiConfig::from_values("http://localhost:8080", "/v1/organisation/accounts")
            .unwrap();
        assert_eq!(
            cfg.account_url().unwrap().as_str(),
            "http://localhost:8080/v1/organisation/accounts"
        );
    }

    #[test]
    fn from_values_rejects_bad_url() {
        let err = ApiConfig::from_values("not a url", "/v1").unwrap_err();
        assert!(
            err.to_string().starts_with("failed parsing base url: "),
            "{}",
            err
        );
        let err = ApiConfig::from_values("mailto:ops@example.com", "/v1").unwrap_err();
        assert!(err.to_string().starts_with("failed parsing base url: "));
    }

    #[test]
    fn account_url_handles_slashes() {
        let cfg = ApiConfig::from_values("http://api.test/base/", "v1/accounts/").unwrap();
        assert_eq!(
            cfg.account_url().unwrap().as_str(),
            "http://api.test/base/v1/accounts"
        );
    }

    #[test]
    fn from_lookup_reports_missing_key() {
        let env: HashMap<&str, &str> = HashMap::from([("BASE_URL", "http://localhost:8080")]);
        let err = ApiConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to get ACCOUNT_PATH from environment variables"
        );

        let err = ApiConfig::from_lookup(|_| None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to get BASE_URL from environment variables"
        );
    }

    #[test]
    fn from_lookup_reads_both_keys() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BASE_URL", "http://accountapi:8080"),
            ("ACCOUNT_PATH", "/v1/organisation/accounts"),
        ]);
        let cfg = ApiConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.base_url, "http://accountapi:8080");
        assert_eq!(cfg.account_path, "/v1/organisation/accounts");
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ApiConfig {
            retry: Some(RetryConfig::default()),
            pool: Some(PoolLimits::default()),
            ..ApiConfig::default()
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ApiConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            base_url = "https://api.staging-form3.tech"
            account_path = "/v1/organisation/accounts"
            timeout_secs = 5

            [retry]
            max_retries = 1
            base_delay_ms = 100
            exponential_base = 2.0
            max_jitter_ms = 0

            [pool]
            max_idle_connections = 4
            max_idle_per_host = 2
            max_connections_per_host = 8
        "#;
        let cfg: ApiConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.timeout(), Duration::from_secs(5));
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.base_delay, Duration::from_millis(100));
        assert_eq!(policy.max_jitter, Duration::ZERO);
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        let pool = cfg.pool_limits();
        assert_eq!(pool.max_idle_connections, 4);
        assert_eq!(pool.max_idle_per_host, 2);
        assert_eq!(pool.max_connections_per_host, 8);
    }

    #[test]
    fn config_toml_minimal() {
        let toml = r#"
            base_url = "http://localhost:8080"
            account_path = "/v1/organisation/accounts"
        "#;
        let cfg: ApiConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.timeout_secs, 100);
        assert!(cfg.retry.is_none());
        assert!(cfg.pool.is_none());
    }

    #[test]
    fn load_or_init_creates_then_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created, ApiConfig::default());

        fs::write(
            &path,
            "base_url = \"http://example.test\"\naccount_path = \"/accounts\"\n",
        )
        .unwrap();
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(loaded.base_url, "http://example.test");
    }

    #[test]
    fn load_from_rejects_invalid_base_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = \"nope\"\naccount_path = \"/a\"\n").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("failed parsing base url"));
    }

    #[test]
    fn load_from_missing_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("read "));
    }
}
