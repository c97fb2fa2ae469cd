//! Counting store adapter (component A): a thin, five-operation command
//! surface over a sorted-set-capable store, used by the sliding-window
//! counter in `rl-limiter`. The adapter does not interpret rate-limiting
//! semantics — it exposes `trim`/`cardinality`/`add`/`expire` and a single
//! optimistic `check_and_commit` transaction, and wraps every transport
//! error as [`RateLimitError::StoreUnavailable`].

#![deny(unsafe_code)]

mod memory;
mod redis_store;

pub use memory::InMemoryCountingStore;
pub use redis_store::RedisCountingStore;

use async_trait::async_trait;
use rl_core::RateLimitError;

/// Outcome of one optimistic `check_and_commit` attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnOutcome {
    /// The event was admitted; `count` includes the just-added event.
    Committed {
        /// Cardinality of the window after the commit.
        count: i64,
    },
    /// The key was already at or above `limit`; nothing was written.
    Rejected {
        /// The observed cardinality that caused the rejection.
        count: i64,
    },
    /// The key changed between the read and the write phase; the caller
    /// should retry from the top.
    Conflict,
}

/// Narrow command surface over an ordered-set-capable counting store.
///
/// Every method maps to one of the five operations in the design:
/// `trim`, `cardinality`, `add`, `expire`, and the optimistic transaction
/// that composes a trim+cardinality read phase with an add+expire write
/// phase, aborting if the key changed since it was observed.
#[async_trait]
pub trait CountingStore: Send + Sync {
    /// Remove entries whose score falls within `[min_score, max_score]`
    /// (inclusive), matching `ZREMRANGEBYSCORE` semantics.
    async fn trim(&self, key: &str, min_score: i64, max_score: i64) -> Result<(), RateLimitError>;

    /// Current entry count for `key`.
    async fn cardinality(&self, key: &str) -> Result<i64, RateLimitError>;

    /// Insert a uniquely-identified timestamped entry.
    async fn add(&self, key: &str, score: i64, member: &str) -> Result<(), RateLimitError>;

    /// Set (or refresh) the TTL on `key`, in seconds.
    async fn expire(&self, key: &str, seconds: i64) -> Result<(), RateLimitError>;

    /// Atomically: trim entries older than `window_start_ms`, observe the
    /// resulting cardinality, and if it is below `limit`, add `member` at
    /// `now_ms` and refresh the TTL to `ttl_seconds`. If `key` is observed
    /// to change between the read and the write, returns
    /// [`TxnOutcome::Conflict`] without applying any write.
    async fn check_and_commit(
        &self,
        key: &str,
        window_start_ms: i64,
        now_ms: i64,
        limit: i64,
        member: &str,
        ttl_seconds: i64,
    ) -> Result<TxnOutcome, RateLimitError>;
}
