//! Policy catalog adapter (component C): read-only lookups of tenants,
//! users, api keys, models, and model tiers, plus the enabled policies
//! applicable to a resolved set of catalog identities.
//!
//! The core treats every value returned here as a read-only snapshot for
//! the duration of one request; nothing in this crate mutates the catalog.

#![deny(unsafe_code)]

mod identities;
mod memory;
mod pg;
mod store;

pub use identities::ResolvedIdentities;
pub use memory::InMemoryCatalogStore;
pub use pg::PgCatalogStore;
pub use store::CatalogStore;
