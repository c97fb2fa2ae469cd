//! In-memory [`CatalogStore`] test double.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rl_core::{Policy, RateLimitError};

use crate::{CatalogStore, ResolvedIdentities};

/// An in-memory [`CatalogStore`], seeded programmatically. Useful for
/// resolver and decision-composer tests that don't want a live Postgres.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    tenants: HashMap<String, i64>,
    users: HashMap<(i64, String), i64>,
    api_keys: HashMap<String, i64>,
    revoked_keys: std::collections::HashSet<i64>,
    models: HashMap<String, (i64, Option<i64>)>,
    tiers: HashMap<String, i64>,
    tier_names: HashMap<i64, String>,
    policies: Vec<Policy>,
}

impl InMemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tenant(&self, name: &str, id: i64) -> &Self {
        self.inner.write().unwrap().tenants.insert(name.to_string(), id);
        self
    }

    pub fn add_user(&self, tenant_id: i64, external_id: &str, id: i64) -> &Self {
        self.inner
            .write()
            .unwrap()
            .users
            .insert((tenant_id, external_id.to_string()), id);
        self
    }

    pub fn add_api_key(&self, raw_key: &str, id: i64) -> &Self {
        self.inner.write().unwrap().api_keys.insert(raw_key.to_string(), id);
        self
    }

    pub fn revoke_api_key(&self, id: i64) -> &Self {
        self.inner.write().unwrap().revoked_keys.insert(id);
        self
    }

    pub fn add_model(&self, name: &str, id: i64, tier_id: Option<i64>) -> &Self {
        self.inner
            .write()
            .unwrap()
            .models
            .insert(name.to_string(), (id, tier_id));
        self
    }

    pub fn add_tier(&self, name: &str, id: i64) -> &Self {
        let mut inner = self.inner.write().unwrap();
        inner.tiers.insert(name.to_string(), id);
        inner.tier_names.insert(id, name.to_string());
        self
    }

    pub fn add_policy(&self, policy: Policy) -> &Self {
        self.inner.write().unwrap().policies.push(policy);
        self
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn lookup_tenant(&self, tenant_id: Option<&str>) -> Result<Option<i64>, RateLimitError> {
        let Some(name) = tenant_id else { return Ok(None) };
        Ok(self.inner.read().unwrap().tenants.get(name).copied())
    }

    async fn lookup_user(
        &self,
        tenant_id: Option<i64>,
        user_id: &str,
    ) -> Result<Option<i64>, RateLimitError> {
        let Some(tenant_id) = tenant_id else { return Ok(None) };
        Ok(self
            .inner
            .read()
            .unwrap()
            .users
            .get(&(tenant_id, user_id.to_string()))
            .copied())
    }

    async fn lookup_api_key(&self, api_key: Option<&str>) -> Result<Option<i64>, RateLimitError> {
        let Some(key) = api_key else { return Ok(None) };
        let inner = self.inner.read().unwrap();
        Ok(inner.api_keys.get(key).copied().filter(|id| !inner.revoked_keys.contains(id)))
    }

    async fn lookup_model(
        &self,
        model_id: &str,
    ) -> Result<Option<(i64, Option<i64>)>, RateLimitError> {
        Ok(self.inner.read().unwrap().models.get(model_id).copied())
    }

    async fn lookup_tier(&self, tier: Option<&str>) -> Result<Option<i64>, RateLimitError> {
        let Some(name) = tier else { return Ok(None) };
        Ok(self.inner.read().unwrap().tiers.get(name).copied())
    }

    async fn tier_name(&self, tier_id: i64) -> Result<Option<String>, RateLimitError> {
        Ok(self.inner.read().unwrap().tier_names.get(&tier_id).cloned())
    }

    async fn applicable_policies(
        &self,
        ids: &ResolvedIdentities,
    ) -> Result<Vec<Policy>, RateLimitError> {
        use rl_core::Scope;

        let inner = self.inner.read().unwrap();
        Ok(inner
            .policies
            .iter()
            .filter(|p| {
                p.enabled
                    && match p.scope {
                        Scope::Global => true,
                        Scope::Tenant => p.tenant_id.is_some() && p.tenant_id == ids.tenant_id,
                        Scope::ApiKey => p.api_key_id.is_some() && p.api_key_id == ids.api_key_id,
                        Scope::Model => p.model_id.is_some() && p.model_id == ids.model_id,
                        Scope::ModelTier => {
                            p.model_tier_id.is_some() && p.model_tier_id == ids.model_tier_id
                        }
                        Scope::UserModel => {
                            p.user_id.is_some()
                                && p.user_id == ids.user_id
                                && p.model_id.is_some()
                                && p.model_id == ids.model_id
                        }
                    }
            })
            .cloned()
            .collect())
    }
}
