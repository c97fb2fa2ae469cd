//! Request Validator, Policy Resolver, Sliding-Window Counter, and Decision
//! Composer: the algorithmic core of the rate limiting decision service.
//!
//! This crate has no knowledge of HTTP or any particular catalog/store
//! backend; it consumes a [`rl_catalog::CatalogStore`] and a
//! [`rl_store::CountingStore`] and exposes a single entry point,
//! [`decide_request`], that wires F -> D -> E (which uses B, which uses A).

#![deny(unsafe_code)]

pub mod counter;
pub mod decision;
pub mod resolver;
pub mod validator;

use rl_catalog::CatalogStore;
use rl_core::{Decision, RateLimitError, RequestContext};
use rl_store::CountingStore;
use tracing::{debug, instrument};

/// Validate, resolve, and decide on one request context in a single call.
///
/// This is the `Decide(ctx) -> Decision` operation the transport layer
/// consumes: `rl-server`'s HTTP handler calls this directly.
#[instrument(skip(catalog, store), fields(user_id = %ctx.user_id, model_id = %ctx.model_id))]
pub async fn decide_request(
    ctx: &RequestContext,
    catalog: &dyn CatalogStore,
    store: &dyn CountingStore,
) -> Result<Decision, RateLimitError> {
    validator::validate(ctx)?;
    let limits = resolver::resolve(ctx, catalog).await?;
    debug!(effective_limits = limits.len(), "resolved effective limits");
    decision::decide(&limits, store).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_catalog::InMemoryCatalogStore;
    use rl_core::{Policy, Scope};
    use rl_store::InMemoryCountingStore;

    fn ctx() -> RequestContext {
        RequestContext {
            user_id: "u".to_string(),
            model_id: "m".to_string(),
            tenant_id: None,
            api_key: None,
            model_tier: None,
        }
    }

    #[tokio::test]
    async fn scenario_1_admit_single_global_policy() {
        let catalog = InMemoryCatalogStore::new();
        catalog.add_policy(Policy {
            id: 1,
            scope: Scope::Global,
            window_seconds: 60,
            limit_value: 10,
            enabled: true,
            tenant_id: None,
            user_id: None,
            api_key_id: None,
            model_id: None,
            model_tier_id: None,
        });
        let store = InMemoryCountingStore::new();

        let decision = decide_request(&ctx(), &catalog, &store).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.limit, 10);
        assert_eq!(decision.count, 1);
        assert_eq!(decision.window_seconds, 60);
        let fulfilled = decision.fulfilled.unwrap();
        assert_eq!(fulfilled.len(), 1);
        assert_eq!(fulfilled[0].label, "GLOBAL");
        assert_eq!(fulfilled[0].count, 1);
    }

    #[tokio::test]
    async fn invalid_request_never_touches_catalog_or_store() {
        let catalog = InMemoryCatalogStore::new();
        let store = InMemoryCountingStore::new();
        let bad = RequestContext {
            user_id: String::new(),
            model_id: "m".to_string(),
            tenant_id: None,
            api_key: None,
            model_tier: None,
        };
        let err = decide_request(&bad, &catalog, &store).await.unwrap_err();
        assert!(matches!(err, RateLimitError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn no_catalog_policies_surfaces_no_policy_not_a_fabricated_accept() {
        let catalog = InMemoryCatalogStore::new();
        let store = InMemoryCountingStore::new();
        let err = decide_request(&ctx(), &catalog, &store).await.unwrap_err();
        assert!(matches!(err, RateLimitError::NoPolicy));
    }
}
