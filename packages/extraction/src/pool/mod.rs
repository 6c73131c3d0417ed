//! Rotating proxy pool.
//!
//! The pool owns every enrolled proxy together with its health record and the
//! pool-wide [`PoolSettings`]. All state lives behind one mutex so that
//! selection and the transition to `in_use` happen in a single critical
//! section: two concurrent callers never receive the same proxy.
//!
//! # Selection order
//!
//! Among eligible proxies, never-used ones come first, then the one idle for
//! the longest time, then the one with the lowest recorded latency. This
//! approximates an idle-and-fast-preferring round robin.
//!
//! # Usage
//!
//! ```rust,ignore
//! let pool = ProxyPool::new();
//! pool.add_many(["1.2.3.4:8080:user:pass"], ProxyProtocol::Http)?;
//!
//! if let Some(proxy) = pool.acquire() {
//!     // ... fetch through proxy ...
//!     pool.record_outcome(&proxy.key(), Some(120), false)?;
//!     pool.mark_cooling_down(&proxy.key())?;
//! }
//! ```

mod parse;

pub use parse::{parse_proxy_line, parse_proxy_lines};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::error::{PoolError, PoolResult};
use crate::types::proxy::{Proxy, ProxyKey, ProxyProtocol, ProxyStatus};
use crate::types::settings::{PoolSettings, PoolSettingsPatch};

#[derive(Debug, Default)]
struct PoolState {
    proxies: IndexMap<ProxyKey, Proxy>,
    settings: PoolSettings,
}

/// Registry of outbound proxies and their health.
#[derive(Debug, Default)]
pub struct ProxyPool {
    state: Mutex<PoolState>,
}

/// Counts reported by [`ProxyPool::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    pub total: usize,
    pub available: usize,
    pub in_use: usize,
    pub cooling_down: usize,
    pub eligible: usize,
}

impl ProxyPool {
    /// Create an empty pool with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty pool with the given settings.
    pub fn with_settings(settings: PoolSettings) -> Self {
        Self {
            state: Mutex::new(PoolState {
                proxies: IndexMap::new(),
                settings,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Select the best eligible proxy and mark it `in_use`.
    ///
    /// Returns `None` when the pool is disabled, empty, or nothing is
    /// eligible. A miss is a normal outcome; callers decide whether to fetch
    /// directly or give up.
    pub fn acquire(&self) -> Option<Proxy> {
        self.acquire_at(Utc::now())
    }

    pub(crate) fn acquire_at(&self, now: DateTime<Utc>) -> Option<Proxy> {
        let mut state = self.state();
        if !state.settings.enabled {
            debug!("Proxy pool disabled, nothing to acquire");
            return None;
        }

        let cooldown = state.settings.cooldown();
        let max_fail_count = state.settings.max_fail_count;

        let key = state
            .proxies
            .values()
            .filter(|p| p.is_eligible(now, cooldown, max_fail_count))
            .min_by(|a, b| selection_order(a, b))
            .map(Proxy::key);

        let Some(key) = key else {
            debug!(total = state.proxies.len(), "No eligible proxy");
            return None;
        };

        let proxy = state.proxies.get_mut(&key)?;
        proxy.status = ProxyStatus::InUse;
        proxy.last_used = Some(now);

        debug!(proxy = %key, "Proxy acquired");
        Some(proxy.clone())
    }

    /// Mark a proxy as being used for a request.
    pub fn mark_in_use(&self, key: &ProxyKey) -> PoolResult<()> {
        self.transition(key, ProxyStatus::InUse, Utc::now())
    }

    /// Start a proxy's cooldown window.
    pub fn mark_cooling_down(&self, key: &ProxyKey) -> PoolResult<()> {
        self.transition(key, ProxyStatus::CoolingDown, Utc::now())
    }

    /// Return a proxy straight to `available`, e.g. after a failed attempt.
    ///
    /// Leaves `last_used` untouched.
    pub fn mark_available(&self, key: &ProxyKey) -> PoolResult<()> {
        let mut state = self.state();
        let proxy = state
            .proxies
            .get_mut(key)
            .ok_or_else(|| PoolError::NotFound(key.to_string()))?;
        proxy.status = ProxyStatus::Available;
        Ok(())
    }

    pub(crate) fn transition(
        &self,
        key: &ProxyKey,
        status: ProxyStatus,
        now: DateTime<Utc>,
    ) -> PoolResult<()> {
        let mut state = self.state();
        let proxy = state
            .proxies
            .get_mut(key)
            .ok_or_else(|| PoolError::NotFound(key.to_string()))?;
        proxy.status = status;
        proxy.last_used = Some(now);
        Ok(())
    }

    /// Record the result of a request made through a proxy.
    ///
    /// Success resets the failure count and stores the latency; failure bumps
    /// the count and leaves latency alone. Health state is not changed.
    pub fn record_outcome(
        &self,
        key: &ProxyKey,
        latency_ms: Option<u64>,
        failed: bool,
    ) -> PoolResult<()> {
        let mut state = self.state();
        let max_fail_count = state.settings.max_fail_count;
        let proxy = state
            .proxies
            .get_mut(key)
            .ok_or_else(|| PoolError::NotFound(key.to_string()))?;

        if failed {
            proxy.failure_count = proxy.failure_count.saturating_add(1);
            if proxy.failure_count >= max_fail_count {
                warn!(
                    proxy = %key,
                    failure_count = proxy.failure_count,
                    "Proxy reached failure ceiling, excluded until next success"
                );
            }
        } else {
            proxy.failure_count = 0;
            if latency_ms.is_some() {
                proxy.last_latency_ms = latency_ms;
            }
        }

        Ok(())
    }

    /// Parse and enroll proxies from raw `host:port[:username[:password]]` lines.
    ///
    /// Proxies whose identity is already enrolled are skipped. Returns the
    /// newly enrolled proxies in input order.
    pub fn add_many<I, S>(&self, lines: I, protocol: ProxyProtocol) -> PoolResult<Vec<Proxy>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = parse_proxy_lines(lines, protocol)?;
        let mut state = self.state();
        let mut added = Vec::with_capacity(parsed.len());

        for proxy in parsed {
            let key = proxy.key();
            if state.proxies.contains_key(&key) {
                debug!(proxy = %key, "Proxy already enrolled, skipping");
                continue;
            }
            state.proxies.insert(key, proxy.clone());
            added.push(proxy);
        }

        info!(
            added = added.len(),
            total = state.proxies.len(),
            protocol = %protocol,
            "Proxies enrolled"
        );
        Ok(added)
    }

    /// Apply a partial settings update and return the resulting settings.
    pub fn update_settings(&self, patch: &PoolSettingsPatch) -> PoolSettings {
        let mut state = self.state();
        state.settings.apply(patch);
        info!(settings = ?state.settings, "Proxy pool settings updated");
        state.settings.clone()
    }

    pub fn settings(&self) -> PoolSettings {
        self.state().settings.clone()
    }

    /// Snapshot of one proxy.
    pub fn get(&self, key: &ProxyKey) -> Option<Proxy> {
        self.state().proxies.get(key).cloned()
    }

    /// Snapshot of every proxy, in enrollment order.
    pub fn list(&self) -> Vec<Proxy> {
        self.state().proxies.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state().proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.state();
        let now = Utc::now();
        let cooldown = state.settings.cooldown();
        let max_fail_count = state.settings.max_fail_count;

        let mut stats = PoolStats {
            total: state.proxies.len(),
            ..Default::default()
        };
        for proxy in state.proxies.values() {
            match proxy.status {
                ProxyStatus::Available => stats.available += 1,
                ProxyStatus::InUse => stats.in_use += 1,
                ProxyStatus::CoolingDown => stats.cooling_down += 1,
            }
            if state.settings.enabled && proxy.is_eligible(now, cooldown, max_fail_count) {
                stats.eligible += 1;
            }
        }
        stats
    }
}

/// Never-used first, then least recently used, then lowest latency.
fn selection_order(a: &Proxy, b: &Proxy) -> Ordering {
    let by_last_used = match (a.last_used, b.last_used) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b),
    };

    by_last_used.then_with(|| {
        a.last_latency_ms
            .unwrap_or(u64::MAX)
            .cmp(&b.last_latency_ms.unwrap_or(u64::MAX))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pool_with(lines: &[&str]) -> ProxyPool {
        let pool = ProxyPool::new();
        pool.add_many(lines.iter().copied(), ProxyProtocol::Http).unwrap();
        pool
    }

    fn key(s: &str) -> ProxyKey {
        let (host, port) = s.split_once(':').unwrap();
        ProxyKey::new(host, port.parse().unwrap())
    }

    #[test]
    fn test_add_many_enrolls_available_http_proxy() {
        let pool = ProxyPool::new();
        let added = pool.add_many(["1.2.3.4:8080:u:p"], ProxyProtocol::default()).unwrap();

        assert_eq!(added.len(), 1);
        let proxy = &added[0];
        assert_eq!(proxy.protocol, ProxyProtocol::Http);
        assert_eq!(proxy.status, ProxyStatus::Available);
        assert_eq!(proxy.failure_count, 0);
        assert!(proxy.last_used.is_none());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_add_many_skips_known_identities() {
        let pool = pool_with(&["1.2.3.4:8080"]);
        let added = pool
            .add_many(["1.2.3.4:8080:u:p", "5.6.7.8:8080"], ProxyProtocol::Http)
            .unwrap();

        assert_eq!(added.len(), 1);
        assert_eq!(added[0].host, "5.6.7.8");
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_add_many_rejects_batch_with_bad_line() {
        let pool = ProxyPool::new();
        assert!(pool.add_many(["1.2.3.4:8080", "nope"], ProxyProtocol::Http).is_err());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_acquire_returns_available_proxy() {
        let pool = pool_with(&["1.2.3.4:8080"]);
        let proxy = pool.acquire().expect("an available proxy must be returned");

        assert_eq!(proxy.status, ProxyStatus::InUse);
        assert!(proxy.last_used.is_some());
    }

    #[test]
    fn test_acquire_is_atomic() {
        let pool = pool_with(&["1.2.3.4:8080"]);
        assert!(pool.acquire().is_some());
        assert!(pool.acquire().is_none());
    }

    #[test]
    fn test_acquire_none_when_empty_or_disabled() {
        assert!(ProxyPool::new().acquire().is_none());

        let pool = pool_with(&["1.2.3.4:8080"]);
        pool.update_settings(&PoolSettingsPatch {
            enabled: Some(false),
            ..Default::default()
        });
        assert!(pool.acquire().is_none());
    }

    #[test]
    fn test_never_used_before_used() {
        let pool = pool_with(&["1.1.1.1:80", "2.2.2.2:80"]);
        let now = Utc::now();
        pool.transition(&key("1.1.1.1:80"), ProxyStatus::Available, now - Duration::hours(1))
            .unwrap();

        let proxy = pool.acquire_at(now).unwrap();
        assert_eq!(proxy.host, "2.2.2.2");
    }

    #[test]
    fn test_least_recently_used_wins() {
        let pool = pool_with(&["1.1.1.1:80", "2.2.2.2:80"]);
        let now = Utc::now();
        pool.transition(&key("1.1.1.1:80"), ProxyStatus::Available, now - Duration::minutes(5))
            .unwrap();
        pool.transition(&key("2.2.2.2:80"), ProxyStatus::Available, now - Duration::minutes(10))
            .unwrap();

        assert_eq!(pool.acquire_at(now).unwrap().host, "2.2.2.2");
    }

    #[test]
    fn test_latency_breaks_ties() {
        let pool = pool_with(&["1.1.1.1:80", "2.2.2.2:80", "3.3.3.3:80"]);
        pool.record_outcome(&key("1.1.1.1:80"), Some(900), false).unwrap();
        pool.record_outcome(&key("2.2.2.2:80"), Some(40), false).unwrap();

        let now = Utc::now();
        assert_eq!(pool.acquire_at(now).unwrap().host, "2.2.2.2");
        assert_eq!(pool.acquire_at(now).unwrap().host, "1.1.1.1");
        assert_eq!(pool.acquire_at(now).unwrap().host, "3.3.3.3");
    }

    #[test]
    fn test_cooling_down_proxy_returns_after_window() {
        let pool = pool_with(&["1.2.3.4:8080"]);
        pool.update_settings(&PoolSettingsPatch {
            cooldown_period: Some(60),
            ..Default::default()
        });
        let now = Utc::now();
        let k = key("1.2.3.4:8080");
        pool.transition(&k, ProxyStatus::CoolingDown, now).unwrap();

        assert!(pool.acquire_at(now + Duration::seconds(59)).is_none());
        let proxy = pool.acquire_at(now + Duration::seconds(60)).unwrap();
        assert_eq!(proxy.status, ProxyStatus::InUse);
    }

    #[test]
    fn test_failure_ceiling_excludes_until_success() {
        let pool = pool_with(&["1.2.3.4:8080"]);
        let k = key("1.2.3.4:8080");
        for _ in 0..3 {
            pool.record_outcome(&k, None, true).unwrap();
        }

        assert_eq!(pool.get(&k).unwrap().failure_count, 3);
        assert_eq!(pool.get(&k).unwrap().status, ProxyStatus::Available);
        assert!(pool.acquire().is_none());

        pool.record_outcome(&k, Some(25), false).unwrap();
        assert_eq!(pool.get(&k).unwrap().failure_count, 0);
        assert!(pool.acquire().is_some());
    }

    #[test]
    fn test_record_outcome_never_changes_status() {
        let pool = pool_with(&["1.2.3.4:8080"]);
        let proxy = pool.acquire().unwrap();
        let k = proxy.key();

        pool.record_outcome(&k, None, true).unwrap();
        assert_eq!(pool.get(&k).unwrap().status, ProxyStatus::InUse);
        pool.record_outcome(&k, Some(10), false).unwrap();
        assert_eq!(pool.get(&k).unwrap().status, ProxyStatus::InUse);
    }

    #[test]
    fn test_failure_keeps_previous_latency() {
        let pool = pool_with(&["1.2.3.4:8080"]);
        let k = key("1.2.3.4:8080");
        pool.record_outcome(&k, Some(120), false).unwrap();
        pool.record_outcome(&k, Some(999), true).unwrap();

        let proxy = pool.get(&k).unwrap();
        assert_eq!(proxy.last_latency_ms, Some(120));
        assert_eq!(proxy.failure_count, 1);
    }

    #[test]
    fn test_unknown_proxy_is_an_error() {
        let pool = ProxyPool::new();
        let k = key("9.9.9.9:1");
        assert!(matches!(pool.mark_in_use(&k), Err(PoolError::NotFound(_))));
        assert!(matches!(pool.record_outcome(&k, None, true), Err(PoolError::NotFound(_))));
    }

    #[test]
    fn test_linear_lifecycle() {
        let pool = pool_with(&["1.2.3.4:8080"]);
        let k = key("1.2.3.4:8080");

        pool.mark_in_use(&k).unwrap();
        assert_eq!(pool.get(&k).unwrap().status, ProxyStatus::InUse);
        pool.mark_cooling_down(&k).unwrap();
        assert_eq!(pool.get(&k).unwrap().status, ProxyStatus::CoolingDown);
        pool.mark_available(&k).unwrap();
        assert_eq!(pool.get(&k).unwrap().status, ProxyStatus::Available);
    }

    #[test]
    fn test_update_settings_is_partial() {
        let pool = ProxyPool::new();
        let before = pool.settings();
        let after = pool.update_settings(&PoolSettingsPatch {
            max_concurrent: Some(5),
            ..Default::default()
        });

        assert_eq!(after.max_concurrent, 5);
        assert_eq!(after.rotation_interval, before.rotation_interval);
        assert_eq!(after.cooldown_period, before.cooldown_period);
        assert_eq!(after.max_fail_count, before.max_fail_count);
        assert_eq!(after.enabled, before.enabled);
        assert_eq!(pool.settings(), after);
    }

    #[test]
    fn test_stats() {
        let pool = pool_with(&["1.1.1.1:80", "2.2.2.2:80", "3.3.3.3:80"]);
        let acquired = pool.acquire().unwrap();
        pool.mark_cooling_down(&acquired.key()).unwrap();
        pool.acquire().unwrap();

        let stats = pool.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.available, 1);
        assert_eq!(stats.in_use, 1);
        assert_eq!(stats.cooling_down, 1);
        assert_eq!(stats.eligible, 1);
    }

    #[tokio::test]
    async fn test_concurrent_acquires_never_share_a_proxy() {
        let pool = std::sync::Arc::new(pool_with(&["1.1.1.1:80", "2.2.2.2:80", "3.3.3.3:80"]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { pool.acquire().map(|p| p.key()) })
            })
            .collect();

        let mut acquired = Vec::new();
        for handle in handles {
            if let Some(key) = handle.await.unwrap() {
                acquired.push(key);
            }
        }

        assert_eq!(acquired.len(), 3);
        acquired.sort();
        acquired.dedup();
        assert_eq!(acquired.len(), 3);
    }
}
