//! Catalog-internal identity resolved from an opaque [`rl_core::RequestContext`].

/// Catalog-internal surrogate keys resolved from the opaque identifiers on
/// a [`rl_core::RequestContext`]. A `None` field means that identity simply
/// didn't resolve (unknown tenant, revoked key, ...); it is not an error —
/// it just means scopes keyed on it never match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedIdentities {
    pub tenant_id: Option<i64>,
    pub user_id: Option<i64>,
    pub api_key_id: Option<i64>,
    pub model_id: Option<i64>,
    /// Effective tier: the request's explicit `modelTier`, falling back to
    /// the target model's own catalog tier.
    pub model_tier_id: Option<i64>,
}
