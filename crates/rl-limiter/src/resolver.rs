//! Policy Resolver (D): maps a request context to an ordered list of
//! Effective Limits, using the Catalog Adapter (C) for identity and policy
//! lookups.

use rl_catalog::{CatalogStore, ResolvedIdentities};
use rl_core::{EffectiveLimit, RateLimitError, RequestContext, Scope};

/// Resolve `ctx` against `catalog` into the ordered set of Effective Limits
/// that apply to it (resolver order: scope precedence descending, ties
/// broken by catalog policy id ascending).
///
/// Returns `Err(RateLimitError::NoPolicy)` if no policy matches; that is the
/// resolver's own business, not a bug in the composer, since an empty list
/// can never be distinguished from "not yet evaluated" downstream.
pub async fn resolve(
    ctx: &RequestContext,
    catalog: &dyn CatalogStore,
) -> Result<Vec<EffectiveLimit>, RateLimitError> {
    let ids = resolve_identities(ctx, catalog).await?;
    let mut policies = catalog.applicable_policies(&ids).await?;

    // Resolver order: precedence desc, then policy id asc (stable catalog
    // insertion order, since ids are assigned in insertion order).
    policies.sort_by(|a, b| {
        b.scope.precedence().cmp(&a.scope.precedence()).then(a.id.cmp(&b.id))
    });

    let mut limits = Vec::with_capacity(policies.len());
    for policy in &policies {
        if !policy.enabled {
            continue;
        }
        let key = effective_key(policy.scope, &ids);
        let label = effective_label(policy.scope, &ids, catalog).await?;
        limits.push(EffectiveLimit {
            key,
            window_seconds: policy.window_seconds,
            limit: policy.limit_value,
            label,
            scope: policy.scope,
        });
    }

    if limits.is_empty() {
        return Err(RateLimitError::NoPolicy);
    }
    Ok(limits)
}

async fn resolve_identities(
    ctx: &RequestContext,
    catalog: &dyn CatalogStore,
) -> Result<ResolvedIdentities, RateLimitError> {
    let tenant_id = catalog.lookup_tenant(ctx.tenant_id.as_deref()).await?;
    let user_id = catalog.lookup_user(tenant_id, &ctx.user_id).await?;
    let api_key_id = catalog.lookup_api_key(ctx.api_key.as_deref()).await?;
    let (model_id, model_tier_from_model) = match catalog.lookup_model(&ctx.model_id).await? {
        Some((id, tier)) => (Some(id), tier),
        None => (None, None),
    };
    let explicit_tier_id = catalog.lookup_tier(ctx.model_tier.as_deref()).await?;
    let model_tier_id = explicit_tier_id.or(model_tier_from_model);

    Ok(ResolvedIdentities { tenant_id, user_id, api_key_id, model_id, model_tier_id })
}

/// Deterministic counting-store key for the scope *instance* — two policies
/// sharing a scope instance (e.g. the same tenant) share one counter.
fn effective_key(scope: Scope, ids: &ResolvedIdentities) -> String {
    match scope {
        Scope::Global => "rl:global".to_string(),
        Scope::Tenant => format!("rl:tenant:{}", ids.tenant_id.unwrap_or_default()),
        Scope::ApiKey => format!("rl:apikey:{}", ids.api_key_id.unwrap_or_default()),
        Scope::Model => format!("rl:model:{}", ids.model_id.unwrap_or_default()),
        Scope::ModelTier => format!("rl:modeltier:{}", ids.model_tier_id.unwrap_or_default()),
        Scope::UserModel => format!(
            "rl:user:{}:model:{}",
            ids.user_id.unwrap_or_default(),
            ids.model_id.unwrap_or_default()
        ),
    }
}

async fn effective_label(
    scope: Scope,
    ids: &ResolvedIdentities,
    catalog: &dyn CatalogStore,
) -> Result<String, RateLimitError> {
    if scope == Scope::ModelTier {
        if let Some(tier_id) = ids.model_tier_id {
            if let Some(name) = catalog.tier_name(tier_id).await? {
                return Ok(format!("{}_TIER", name.to_uppercase()));
            }
        }
    }
    Ok(scope.label().to_string())
}
