//! Sliding-Window Counter (B): atomic, distributed, per-key admission
//! decisions against the Counting Store Adapter (A), with bounded retry on
//! optimistic-concurrency conflict.

use rl_core::{ids, RateLimitError};
use rl_store::{CountingStore, TxnOutcome};
use tracing::warn;

/// Number of `Conflict` retries before the counter gives up and reports
/// unrecoverable contention.
pub const MAX_RETRIES: u32 = 5;

/// Result of one [`check_and_consume`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterResult {
    pub allowed: bool,
    /// On admit: the new count including the just-added event. On reject:
    /// the observed count that caused it. On unrecoverable contention: -1.
    pub count: i64,
}

/// Admit at most one event against `(key, window_seconds, limit)`,
/// retrying on store-reported conflict up to [`MAX_RETRIES`] times.
pub async fn check_and_consume(
    store: &dyn CountingStore,
    key: &str,
    window_seconds: i64,
    limit: i64,
) -> Result<CounterResult, RateLimitError> {
    for attempt in 0..MAX_RETRIES {
        let now_ms = ids::now_ms() as i64;
        let window_start_ms = now_ms - window_seconds * 1000;
        let member = format!("{now_ms}-{}", ids::next_monotonic_id());

        match store
            .check_and_commit(key, window_start_ms, now_ms, limit, &member, window_seconds * 2)
            .await?
        {
            TxnOutcome::Committed { count } => return Ok(CounterResult { allowed: true, count }),
            TxnOutcome::Rejected { count } => {
                return Ok(CounterResult { allowed: false, count })
            }
            TxnOutcome::Conflict => {
                warn!(key, attempt, "counting store reported a write conflict, retrying");
            }
        }
    }
    Ok(CounterResult { allowed: false, count: -1 })
}
