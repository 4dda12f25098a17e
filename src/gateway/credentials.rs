//! Cached gateway credentials.
//!
//! The cache is an explicit object with an injected clock and an explicit
//! `invalidate` call; nothing here lives in module-level state. The
//! credential source is a port so tests can count fetches.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct GatewayCredentials {
    pub token: String,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<GatewayCredentials>;
}

/// Source backed by the fixed token in configuration.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialSource for StaticTokenSource {
    async fn fetch(&self) -> anyhow::Result<GatewayCredentials> {
        Ok(GatewayCredentials {
            token: self.token.clone(),
        })
    }
}

struct CacheSlot {
    credentials: GatewayCredentials,
    fetched_at: DateTime<Utc>,
}

pub struct CredentialCache {
    source: Box<dyn CredentialSource>,
    clock: Box<dyn Clock>,
    ttl: Duration,
    slot: Mutex<Option<CacheSlot>>,
}

impl CredentialCache {
    pub fn new(source: Box<dyn CredentialSource>, clock: Box<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return cached credentials, fetching through the source when the
    /// entry is missing or older than the TTL.
    pub async fn get(&self) -> anyhow::Result<GatewayCredentials> {
        let mut slot = self.slot.lock().await;
        let now = self.clock.now();

        if let Some(cached) = slot.as_ref() {
            if now - cached.fetched_at < self.ttl {
                return Ok(cached.credentials.clone());
            }
        }

        let credentials = self.source.fetch().await?;
        *slot = Some(CacheSlot {
            credentials: credentials.clone(),
            fetched_at: now,
        });
        Ok(credentials)
    }

    /// Drop the cached entry; the next `get` fetches fresh credentials.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FakeClock {
        now: std::sync::Mutex<DateTime<Utc>>,
    }

    impl FakeClock {
        fn at(start: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                now: std::sync::Mutex::new(start),
            })
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for Arc<FakeClock> {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    struct CountingSource {
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CredentialSource for CountingSource {
        async fn fetch(&self) -> anyhow::Result<GatewayCredentials> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(GatewayCredentials {
                token: format!("token-{n}"),
            })
        }
    }

    fn cache_with_ttl(ttl: Duration) -> (CredentialCache, Arc<FakeClock>, Arc<AtomicUsize>) {
        let clock = FakeClock::at(Utc::now());
        let fetches = Arc::new(AtomicUsize::new(0));
        let cache = CredentialCache::new(
            Box::new(CountingSource {
                fetches: fetches.clone(),
            }),
            Box::new(clock.clone()),
            ttl,
        );
        (cache, clock, fetches)
    }

    #[tokio::test]
    async fn single_fetch_within_ttl() {
        let (cache, _clock, fetches) = cache_with_ttl(Duration::seconds(60));

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert_eq!(first.token, "token-1");
        assert_eq!(second.token, "token-1");
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ttl_expiry_triggers_refetch() {
        let (cache, clock, fetches) = cache_with_ttl(Duration::seconds(60));

        cache.get().await.unwrap();
        clock.advance(Duration::seconds(61));
        let refreshed = cache.get().await.unwrap();

        assert_eq!(refreshed.token, "token-2");
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let (cache, _clock, fetches) = cache_with_ttl(Duration::seconds(60));

        cache.get().await.unwrap();
        cache.invalidate().await;
        let refreshed = cache.get().await.unwrap();

        assert_eq!(refreshed.token, "token-2");
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }
}
