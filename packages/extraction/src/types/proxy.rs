//! Proxy identities and their health state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::PoolError;
use crate::security::ProxyCredentials;

/// Wire protocol spoken by an upstream proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyProtocol {
    /// Plain HTTP proxy (CONNECT for https targets)
    #[default]
    Http,
    /// SOCKS5 proxy
    #[serde(alias = "socks")]
    Socks5,
}

impl ProxyProtocol {
    /// URL scheme understood by reqwest's proxy support.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Socks5 => "socks5",
        }
    }
}

impl FromStr for ProxyProtocol {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "https" => Ok(Self::Http),
            "socks5" | "socks" => Ok(Self::Socks5),
            other => Err(PoolError::UnknownProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for ProxyProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Health state of a proxy. Per use it moves available → in_use → cooling_down → available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyStatus {
    #[default]
    Available,
    InUse,
    CoolingDown,
}

/// Identity of a proxy inside the pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyKey {
    pub host: String,
    pub port: u16,
}

impl ProxyKey {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ProxyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// An outbound proxy and its usage record.
///
/// Serialized without the password.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    pub host: String,
    pub port: u16,
    #[serde(rename = "type")]
    pub protocol: ProxyProtocol,
    #[serde(rename = "username", serialize_with = "serialize_username")]
    pub credentials: Option<ProxyCredentials>,
    pub status: ProxyStatus,
    pub failure_count: u32,
    pub last_used: Option<DateTime<Utc>>,
    pub last_latency_ms: Option<u64>,
}

fn serialize_username<S: Serializer>(
    credentials: &Option<ProxyCredentials>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match credentials {
        Some(creds) => serializer.serialize_some(&creds.username),
        None => serializer.serialize_none(),
    }
}

impl Proxy {
    /// A freshly enrolled proxy: available, never used, no failures.
    pub fn new(host: impl Into<String>, port: u16, protocol: ProxyProtocol) -> Self {
        Self {
            host: host.into(),
            port,
            protocol,
            credentials: None,
            status: ProxyStatus::Available,
            failure_count: 0,
            last_used: None,
            last_latency_ms: None,
        }
    }

    pub fn with_credentials(mut self, credentials: ProxyCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn key(&self) -> ProxyKey {
        ProxyKey::new(self.host.clone(), self.port)
    }

    /// `scheme://host:port`, without credentials.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol.scheme(), self.host, self.port)
    }

    /// Whether the cooldown window that started at `last_used` has elapsed.
    pub fn cooldown_elapsed(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        match self.last_used {
            Some(last_used) => now - last_used >= cooldown,
            None => true,
        }
    }

    /// Selection eligibility, ignoring the pool-wide enabled flag.
    pub fn is_eligible(&self, now: DateTime<Utc>, cooldown: Duration, max_fail_count: u32) -> bool {
        if self.failure_count >= max_fail_count {
            return false;
        }

        match self.status {
            ProxyStatus::Available => true,
            ProxyStatus::CoolingDown => self.cooldown_elapsed(now, cooldown),
            ProxyStatus::InUse => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parsing() {
        assert_eq!("http".parse::<ProxyProtocol>().unwrap(), ProxyProtocol::Http);
        assert_eq!("SOCKS5".parse::<ProxyProtocol>().unwrap(), ProxyProtocol::Socks5);
        assert!("ftp".parse::<ProxyProtocol>().is_err());
    }

    #[test]
    fn test_proxy_url() {
        let proxy = Proxy::new("10.0.0.1", 1080, ProxyProtocol::Socks5);
        assert_eq!(proxy.url(), "socks5://10.0.0.1:1080");
        assert_eq!(proxy.key().to_string(), "10.0.0.1:1080");
    }

    #[test]
    fn test_in_use_is_never_eligible() {
        let mut proxy = Proxy::new("10.0.0.1", 8080, ProxyProtocol::Http);
        proxy.status = ProxyStatus::InUse;
        assert!(!proxy.is_eligible(Utc::now(), Duration::zero(), 3));
    }

    #[test]
    fn test_cooling_down_respects_window() {
        let now = Utc::now();
        let mut proxy = Proxy::new("10.0.0.1", 8080, ProxyProtocol::Http);
        proxy.status = ProxyStatus::CoolingDown;
        proxy.last_used = Some(now - Duration::seconds(30));

        assert!(!proxy.is_eligible(now, Duration::seconds(60), 3));
        assert!(proxy.is_eligible(now, Duration::seconds(30), 3));
    }

    #[test]
    fn test_failure_ceiling_excludes_available_proxy() {
        let mut proxy = Proxy::new("10.0.0.1", 8080, ProxyProtocol::Http);
        proxy.failure_count = 3;
        assert!(!proxy.is_eligible(Utc::now(), Duration::zero(), 3));
    }

    #[test]
    fn test_serialization_hides_password() {
        let proxy = Proxy::new("1.2.3.4", 8080, ProxyProtocol::Http)
            .with_credentials(ProxyCredentials::new("u", "secret-pass"));
        let json = serde_json::to_string(&proxy).unwrap();

        assert!(json.contains("\"username\":\"u\""));
        assert!(json.contains("\"type\":\"http\""));
        assert!(json.contains("\"status\":\"available\""));
        assert!(json.contains("\"failureCount\":0"));
        assert!(!json.contains("secret-pass"));
    }
}
