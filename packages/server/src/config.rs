use anyhow::{Context, Result};
use dotenvy::dotenv;
use extraction::{PoolSettings, ProxyPool, ProxyProtocol};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    /// File of `host:port[:username[:password]]` lines enrolled at startup
    pub proxy_list_file: Option<PathBuf>,
    pub proxy_list_type: ProxyProtocol,
    pub pool_settings: PoolSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PoolSettings::default();

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000).context("PORT must be a valid number")?,
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            proxy_list_file: lookup("PROXY_LIST_FILE")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            proxy_list_type: parse_or(&lookup, "PROXY_LIST_TYPE", ProxyProtocol::Http)
                .context("PROXY_LIST_TYPE must be http or socks5")?,
            pool_settings: PoolSettings {
                rotation_interval: parse_or(
                    &lookup,
                    "PROXY_ROTATION_INTERVAL",
                    defaults.rotation_interval,
                )
                .context("PROXY_ROTATION_INTERVAL must be a number of seconds")?,
                max_concurrent: parse_or(&lookup, "PROXY_MAX_CONCURRENT", defaults.max_concurrent)
                    .context("PROXY_MAX_CONCURRENT must be a valid number")?,
                cooldown_period: parse_or(
                    &lookup,
                    "PROXY_COOLDOWN_PERIOD",
                    defaults.cooldown_period,
                )
                .context("PROXY_COOLDOWN_PERIOD must be a number of seconds")?,
                max_fail_count: parse_or(&lookup, "PROXY_MAX_FAIL_COUNT", defaults.max_fail_count)
                    .context("PROXY_MAX_FAIL_COUNT must be a valid number")?,
                enabled: parse_or(&lookup, "PROXY_ENABLED", defaults.enabled)
                    .context("PROXY_ENABLED must be true or false")?,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Enroll the proxies listed in `PROXY_LIST_FILE`, if one is configured.
    ///
    /// Returns the number of newly enrolled proxies.
    pub fn enroll_proxy_list(&self, pool: &ProxyPool) -> Result<usize> {
        let Some(path) = &self.proxy_list_file else {
            return Ok(0);
        };

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read proxy list {}", path.display()))?;
        let added = pool
            .add_many(contents.lines(), self.proxy_list_type)
            .with_context(|| format!("Invalid proxy list {}", path.display()))?;

        Ok(added.len())
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name}={raw:?} could not be parsed")),
        _ => Ok(default),
    }
}
