//! Shared application state: the catalog and counting-store adapters,
//! already wrapped with their per-operation deadlines (see
//! [`crate::timeout`]).

use std::sync::Arc;

use rl_catalog::CatalogStore;
use rl_store::CountingStore;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub store: Arc<dyn CountingStore>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, store: Arc<dyn CountingStore>) -> Self {
        Self { catalog, store }
    }
}
