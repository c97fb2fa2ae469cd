//! Per-operation deadlines around the catalog and counting-store adapters,
//! enforced with `tokio::time::timeout` (grounded in the teacher crate's
//! `retry`/`sleep`/`timeout` combinators).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rl_catalog::{CatalogStore, ResolvedIdentities};
use rl_core::{Policy, RateLimitError};
use rl_store::{CountingStore, TxnOutcome};

/// Wraps a [`CatalogStore`], bounding every call to `timeout`.
pub struct TimeoutCatalogStore {
    inner: Arc<dyn CatalogStore>,
    timeout: Duration,
}

impl TimeoutCatalogStore {
    #[must_use]
    pub fn new(inner: Arc<dyn CatalogStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

fn expired() -> RateLimitError {
    RateLimitError::CatalogUnavailable("catalog operation deadline exceeded".to_string())
}

#[async_trait]
impl CatalogStore for TimeoutCatalogStore {
    async fn lookup_tenant(&self, tenant_id: Option<&str>) -> Result<Option<i64>, RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.lookup_tenant(tenant_id)).await.map_err(|_| expired())?
    }

    async fn lookup_user(
        &self,
        tenant_id: Option<i64>,
        user_id: &str,
    ) -> Result<Option<i64>, RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.lookup_user(tenant_id, user_id))
            .await
            .map_err(|_| expired())?
    }

    async fn lookup_api_key(&self, api_key: Option<&str>) -> Result<Option<i64>, RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.lookup_api_key(api_key)).await.map_err(|_| expired())?
    }

    async fn lookup_model(
        &self,
        model_id: &str,
    ) -> Result<Option<(i64, Option<i64>)>, RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.lookup_model(model_id)).await.map_err(|_| expired())?
    }

    async fn lookup_tier(&self, tier: Option<&str>) -> Result<Option<i64>, RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.lookup_tier(tier)).await.map_err(|_| expired())?
    }

    async fn tier_name(&self, tier_id: i64) -> Result<Option<String>, RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.tier_name(tier_id)).await.map_err(|_| expired())?
    }

    async fn applicable_policies(
        &self,
        ids: &ResolvedIdentities,
    ) -> Result<Vec<Policy>, RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.applicable_policies(ids))
            .await
            .map_err(|_| expired())?
    }
}

/// Wraps a [`CountingStore`], bounding every call to `timeout`.
pub struct TimeoutCountingStore {
    inner: Arc<dyn CountingStore>,
    timeout: Duration,
}

impl TimeoutCountingStore {
    #[must_use]
    pub fn new(inner: Arc<dyn CountingStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

fn store_expired() -> RateLimitError {
    RateLimitError::StoreUnavailable("counting store operation deadline exceeded".to_string())
}

#[async_trait]
impl CountingStore for TimeoutCountingStore {
    async fn trim(&self, key: &str, min_score: i64, max_score: i64) -> Result<(), RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.trim(key, min_score, max_score))
            .await
            .map_err(|_| store_expired())?
    }

    async fn cardinality(&self, key: &str) -> Result<i64, RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.cardinality(key)).await.map_err(|_| store_expired())?
    }

    async fn add(&self, key: &str, score: i64, member: &str) -> Result<(), RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.add(key, score, member))
            .await
            .map_err(|_| store_expired())?
    }

    async fn expire(&self, key: &str, seconds: i64) -> Result<(), RateLimitError> {
        tokio::time::timeout(self.timeout, self.inner.expire(key, seconds)).await.map_err(|_| store_expired())?
    }

    async fn check_and_commit(
        &self,
        key: &str,
        window_start_ms: i64,
        now_ms: i64,
        limit: i64,
        member: &str,
        ttl_seconds: i64,
    ) -> Result<TxnOutcome, RateLimitError> {
        tokio::time::timeout(
            self.timeout,
            self.inner.check_and_commit(key, window_start_ms, now_ms, limit, member, ttl_seconds),
        )
        .await
        .map_err(|_| store_expired())?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_catalog::InMemoryCatalogStore;
    use rl_store::InMemoryCountingStore;

    #[tokio::test]
    async fn wrapped_catalog_store_passes_through_when_fast_enough() {
        let inner: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        let wrapped = TimeoutCatalogStore::new(inner, Duration::from_millis(250));
        assert_eq!(wrapped.lookup_tenant(Some("nobody")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn wrapped_counting_store_passes_through_when_fast_enough() {
        let inner: Arc<dyn CountingStore> = Arc::new(InMemoryCountingStore::new());
        let wrapped = TimeoutCountingStore::new(inner, Duration::from_millis(250));
        assert_eq!(wrapped.cardinality("k").await.unwrap(), 0);
    }
}
