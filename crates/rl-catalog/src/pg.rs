//! Postgres-backed [`CatalogStore`], following the `sqlx::query_as` +
//! `PgPool` pattern used throughout this codebase's database services.

use async_trait::async_trait;
use rl_core::{Policy, RateLimitError, Scope};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, PgPool, Row};
use tracing::debug;

use crate::{CatalogStore, ResolvedIdentities};

/// A [`CatalogStore`] backed by the Postgres schema in
/// `migrations/0001_init.sql`.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `dsn` with a small fixed-size pool, suitable for the
    /// per-request lookups this adapter performs.
    pub async fn connect(dsn: &str) -> Result<Self, RateLimitError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(dsn)
            .await
            .map_err(|e| RateLimitError::CatalogUnavailable(format!("connect: {e}")))?;
        Ok(Self::new(pool))
    }
}

fn unavailable(e: sqlx::Error) -> RateLimitError {
    RateLimitError::CatalogUnavailable(e.to_string())
}

fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(FromRow)]
struct PolicyRow {
    id: i64,
    scope: String,
    window_seconds: i64,
    limit_value: i64,
    enabled: bool,
    tenant_id: Option<i64>,
    user_id: Option<i64>,
    api_key_id: Option<i64>,
    model_id: Option<i64>,
    model_tier_id: Option<i64>,
}

impl TryFrom<PolicyRow> for Policy {
    type Error = RateLimitError;

    fn try_from(row: PolicyRow) -> Result<Self, Self::Error> {
        let scope = row.scope.parse::<Scope>().map_err(|e| {
            RateLimitError::CatalogUnavailable(format!("policy {}: {e}", row.id))
        })?;
        Ok(Policy {
            id: row.id,
            scope,
            window_seconds: row.window_seconds,
            limit_value: row.limit_value,
            enabled: row.enabled,
            tenant_id: row.tenant_id,
            user_id: row.user_id,
            api_key_id: row.api_key_id,
            model_id: row.model_id,
            model_tier_id: row.model_tier_id,
        })
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn lookup_tenant(&self, tenant_id: Option<&str>) -> Result<Option<i64>, RateLimitError> {
        let Some(name) = tenant_id else { return Ok(None) };
        let row = sqlx::query("SELECT id FROM tenant WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(row.map(|r| r.get::<i64, _>("id")))
    }

    async fn lookup_user(
        &self,
        tenant_id: Option<i64>,
        user_id: &str,
    ) -> Result<Option<i64>, RateLimitError> {
        let Some(tenant_id) = tenant_id else { return Ok(None) };
        let row = sqlx::query(
            "SELECT id FROM user_account WHERE tenant_id = $1 AND external_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(row.map(|r| r.get::<i64, _>("id")))
    }

    async fn lookup_api_key(&self, api_key: Option<&str>) -> Result<Option<i64>, RateLimitError> {
        let Some(api_key) = api_key else { return Ok(None) };
        let hash = hash_api_key(api_key);
        let row = sqlx::query("SELECT id FROM api_key WHERE key_hash = $1 AND revoked = FALSE")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(row.map(|r| r.get::<i64, _>("id")))
    }

    async fn lookup_model(
        &self,
        model_id: &str,
    ) -> Result<Option<(i64, Option<i64>)>, RateLimitError> {
        let row = sqlx::query("SELECT id, tier_id FROM model WHERE name = $1")
            .bind(model_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(row.map(|r| (r.get::<i64, _>("id"), r.get::<Option<i64>, _>("tier_id"))))
    }

    async fn lookup_tier(&self, tier: Option<&str>) -> Result<Option<i64>, RateLimitError> {
        let Some(name) = tier else { return Ok(None) };
        let row = sqlx::query("SELECT id FROM model_tier WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(row.map(|r| r.get::<i64, _>("id")))
    }

    async fn tier_name(&self, tier_id: i64) -> Result<Option<String>, RateLimitError> {
        let row = sqlx::query("SELECT name FROM model_tier WHERE id = $1")
            .bind(tier_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(row.map(|r| r.get::<String, _>("name")))
    }

    async fn applicable_policies(
        &self,
        ids: &ResolvedIdentities,
    ) -> Result<Vec<Policy>, RateLimitError> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            r"
            SELECT id, scope, window_seconds, limit_value, enabled,
                   tenant_id, user_id, api_key_id, model_id, model_tier_id
            FROM rate_limit_policy
            WHERE enabled = TRUE
              AND (
                    scope = 'GLOBAL'
                 OR (scope = 'TENANT' AND tenant_id = $1)
                 OR (scope = 'API_KEY' AND api_key_id = $2)
                 OR (scope = 'MODEL' AND model_id = $3)
                 OR (scope = 'MODEL_TIER' AND model_tier_id = $4)
                 OR (scope = 'USER_MODEL' AND user_id = $5 AND model_id = $3)
              )
            ORDER BY id ASC
            ",
        )
        .bind(ids.tenant_id)
        .bind(ids.api_key_id)
        .bind(ids.model_id)
        .bind(ids.model_tier_id)
        .bind(ids.user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        debug!(count = rows.len(), "catalog returned applicable policy rows");
        rows.into_iter().map(Policy::try_from).collect()
    }
}
