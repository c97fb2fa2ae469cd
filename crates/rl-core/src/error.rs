//! Error taxonomy for the rate limiting decision service.
//!
//! One variant per failure kind named in the design's error-handling table;
//! adapters (`rl-catalog`, `rl-store`) wrap driver-specific errors into this
//! type at the boundary so the core never matches on `sqlx`/`redis` errors.

use thiserror::Error;

/// Failure kinds produced anywhere along `Decide(ctx) -> Decision`.
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// `userId` or `modelId` missing or empty.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Catalog I/O, query, or deadline failure.
    #[error("policy resolve error: {0}")]
    CatalogUnavailable(String),

    /// The resolver produced an empty effective-limit list.
    #[error("no policy resolved")]
    NoPolicy,

    /// Non-conflict counting-store error (transport, deadline, protocol).
    #[error("rate limit store unavailable: {0}")]
    StoreUnavailable(String),

    /// A counter call exhausted its retry budget under contention.
    #[error("rate limit store contention")]
    StoreContention,
}

impl RateLimitError {
    /// The HTTP status code this error maps to, per the design's error table.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::CatalogUnavailable(_) | Self::NoPolicy => 500,
            Self::StoreUnavailable(_) | Self::StoreContention => 503,
        }
    }
}
