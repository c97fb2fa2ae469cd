//! HTTP surface for the rate limiting decision service: routes, CORS,
//! configuration, and the per-operation deadline wrappers around the
//! catalog and counting-store adapters.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod timeout;

use std::sync::Arc;

use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;
use crate::state::AppState;
use crate::timeout::{TimeoutCatalogStore, TimeoutCountingStore};

/// Build the CORS layer from configuration: a comma-separated allow-list,
/// or permissive (`Any`) when none is configured (the development default).
#[must_use]
pub fn cors_layer(cfg: &Config) -> CorsLayer {
    if cfg.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<_> =
        cfg.cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(tower_http::cors::Any)
}

/// Wrap raw catalog/store adapters with their configured per-operation
/// deadlines and assemble the shared [`AppState`].
#[must_use]
pub fn build_state(
    catalog: Arc<dyn rl_catalog::CatalogStore>,
    store: Arc<dyn rl_store::CountingStore>,
    cfg: &Config,
) -> AppState {
    let catalog: Arc<dyn rl_catalog::CatalogStore> =
        Arc::new(TimeoutCatalogStore::new(catalog, cfg.catalog_timeout));
    let store: Arc<dyn rl_store::CountingStore> =
        Arc::new(TimeoutCountingStore::new(store, cfg.store_timeout));
    AppState::new(catalog, store)
}
