//! Core data model: request contexts, scopes, catalog policies, effective
//! limits, and the final decision returned to callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A category of identity against which rate limits are enforced.
///
/// Ordered by precedence (higher = more specific); see [`Scope::precedence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    Global,
    ModelTier,
    Model,
    Tenant,
    ApiKey,
    UserModel,
}

impl Scope {
    /// Fixed precedence used to order effective limits and break ties;
    /// higher values are more specific.
    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            Scope::Global => 1,
            Scope::ModelTier => 2,
            Scope::Model => 3,
            Scope::Tenant => 4,
            Scope::ApiKey => 5,
            Scope::UserModel => 6,
        }
    }

    /// The scope name used as a label when no richer label can be derived.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Scope::Global => "GLOBAL",
            Scope::ModelTier => "MODEL_TIER",
            Scope::Model => "MODEL",
            Scope::Tenant => "TENANT",
            Scope::ApiKey => "API_KEY",
            Scope::UserModel => "USER_MODEL",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a catalog-stored scope string doesn't match the
/// closed set of known scopes.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown scope: {0}")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GLOBAL" => Ok(Scope::Global),
            "MODEL_TIER" => Ok(Scope::ModelTier),
            "MODEL" => Ok(Scope::Model),
            "TENANT" => Ok(Scope::Tenant),
            "API_KEY" => Ok(Scope::ApiKey),
            "USER_MODEL" => Ok(Scope::UserModel),
            other => Err(UnknownScope(other.to_string())),
        }
    }
}

/// An incoming request context, identifying the caller and the target model.
///
/// `user_id` and `model_id` are required; the rest narrow which catalog
/// policies apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub user_id: String,
    pub model_id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model_tier: Option<String>,
}

/// A policy catalog record. Immutable to the core; the catalog is the
/// source of truth and the core only reads snapshots of it per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub id: i64,
    pub scope: Scope,
    pub window_seconds: i64,
    pub limit_value: i64,
    pub enabled: bool,
    pub tenant_id: Option<i64>,
    pub user_id: Option<i64>,
    pub api_key_id: Option<i64>,
    pub model_id: Option<i64>,
    pub model_tier_id: Option<i64>,
}

/// A concrete `(key, window, limit, label)` derived from a catalog policy
/// for a specific request context; the resolver's output element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveLimit {
    /// Deterministic counting-store key for the scope *instance* (not the
    /// policy record) — two policies over the same scope instance share one
    /// counter.
    pub key: String,
    pub window_seconds: i64,
    pub limit: i64,
    /// Human-readable tag, e.g. `PREMIUM_TIER` or the bare scope name.
    pub label: String,
    pub scope: Scope,
}

/// One successfully admitted effective limit, as reported in
/// [`Decision::fulfilled`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FulfilledLimit {
    pub label: String,
    pub key: String,
    pub limit: i64,
    pub count: i64,
    pub window_seconds: i64,
}

/// The final admission decision returned by `Decide(ctx)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub allowed: bool,
    pub limit: i64,
    pub count: i64,
    pub window_seconds: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfilled: Option<Vec<FulfilledLimit>>,
}
