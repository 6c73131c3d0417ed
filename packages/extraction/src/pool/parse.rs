//! Parsing of raw `host:port[:username[:password]]` proxy lines.

use crate::error::{PoolError, PoolResult};
use crate::security::ProxyCredentials;
use crate::types::proxy::{Proxy, ProxyProtocol};

/// Parse one proxy line into a freshly enrolled proxy.
///
/// Accepted forms:
/// - `host:port`
/// - `host:port:username` (empty password)
/// - `host:port:username:password`
pub fn parse_proxy_line(line: &str, protocol: ProxyProtocol) -> PoolResult<Proxy> {
    let invalid = |reason: &str| PoolError::InvalidProxyLine {
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = line.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 4 {
        return Err(invalid("expected host:port[:username[:password]]"));
    }

    let host = parts[0].trim();
    if host.is_empty() {
        return Err(invalid("missing host"));
    }

    let port: u16 = parts[1]
        .trim()
        .parse()
        .map_err(|_| invalid("port must be a number between 1 and 65535"))?;
    if port == 0 {
        return Err(invalid("port must be a number between 1 and 65535"));
    }

    let mut proxy = Proxy::new(host, port, protocol);

    if let Some(username) = parts.get(2).map(|u| u.trim()).filter(|u| !u.is_empty()) {
        let password = parts.get(3).map(|p| p.trim()).unwrap_or_default();
        proxy = proxy.with_credentials(ProxyCredentials::new(username, password));
    }

    Ok(proxy)
}

/// Parse a batch, skipping blank lines. Any malformed line fails the batch.
pub fn parse_proxy_lines<I, S>(lines: I, protocol: ProxyProtocol) -> PoolResult<Vec<Proxy>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter(|line| !line.as_ref().trim().is_empty())
        .map(|line| parse_proxy_line(line.as_ref(), protocol))
        .collect()
}
