//! The [`CatalogStore`] trait: the narrow read interface the resolver
//! consumes.

use async_trait::async_trait;
use rl_core::{Policy, RateLimitError};

use crate::ResolvedIdentities;

/// Read-only lookups over the policy catalog.
///
/// Every method returns `Ok(None)` for an identifier that simply doesn't
/// resolve (unknown tenant, revoked key, ...) — that is not an error. Only
/// catalog I/O or schema failures surface as
/// [`RateLimitError::CatalogUnavailable`].
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Resolve an opaque tenant identifier to its catalog-internal id.
    async fn lookup_tenant(&self, tenant_id: Option<&str>) -> Result<Option<i64>, RateLimitError>;

    /// Resolve an opaque user identifier, scoped by tenant. Returns `None`
    /// if `tenant_id` is `None` (a user is always scoped to a tenant).
    async fn lookup_user(
        &self,
        tenant_id: Option<i64>,
        user_id: &str,
    ) -> Result<Option<i64>, RateLimitError>;

    /// Resolve an API key to its catalog-internal id, unless it is revoked.
    async fn lookup_api_key(&self, api_key: Option<&str>) -> Result<Option<i64>, RateLimitError>;

    /// Resolve a model to its catalog-internal id and its own catalog tier
    /// (used when the request doesn't supply an explicit `modelTier`).
    async fn lookup_model(
        &self,
        model_id: &str,
    ) -> Result<Option<(i64, Option<i64>)>, RateLimitError>;

    /// Resolve an explicit tier name to its catalog-internal id.
    async fn lookup_tier(&self, tier: Option<&str>) -> Result<Option<i64>, RateLimitError>;

    /// Human-readable name for a tier id, used for `MODEL_TIER` label
    /// enrichment (e.g. `"premium"` -> label `PREMIUM_TIER`).
    async fn tier_name(&self, tier_id: i64) -> Result<Option<String>, RateLimitError>;

    /// All enabled policies whose scope predicate matches at least one of
    /// `ids`' resolved identities (`GLOBAL` always matches).
    async fn applicable_policies(
        &self,
        ids: &ResolvedIdentities,
    ) -> Result<Vec<Policy>, RateLimitError>;
}
