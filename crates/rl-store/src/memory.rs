//! In-process [`CountingStore`] used by `rl-limiter`'s unit/property tests
//! and by `rl-server` integration tests, so the full request path is
//! testable without a live Redis instance.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rl_core::ids::now_ms;
use rl_core::RateLimitError;

use crate::{CountingStore, TxnOutcome};

struct KeyState {
    entries: Vec<(i64, String)>,
    expires_at_ms: Option<i64>,
}

impl KeyState {
    fn new() -> Self {
        Self { entries: Vec::new(), expires_at_ms: None }
    }

    /// Remove entries whose score falls within `[min, max]` (inclusive),
    /// matching `ZREMRANGEBYSCORE` semantics.
    fn trim(&mut self, min: i64, max: i64) {
        self.entries.retain(|(score, _)| *score < min || *score > max);
    }
}

/// A `Mutex`-guarded, per-key ordered event list. `check_and_commit` holds
/// the lock for the full read-decide-write cycle, so it never needs to
/// retry: the in-memory store has no concurrent-writer conflict to detect.
#[derive(Default)]
pub struct InMemoryCountingStore {
    keys: Mutex<HashMap<String, KeyState>>,
}

impl InMemoryCountingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sweep_expired(keys: &mut HashMap<String, KeyState>, key: &str, now: i64) {
        if let Some(state) = keys.get(key) {
            if let Some(expires_at) = state.expires_at_ms {
                if now >= expires_at {
                    keys.remove(key);
                }
            }
        }
    }
}

#[async_trait]
impl CountingStore for InMemoryCountingStore {
    async fn trim(&self, key: &str, min_score: i64, max_score: i64) -> Result<(), RateLimitError> {
        let mut keys = self.keys.lock().expect("counting store lock poisoned");
        Self::sweep_expired(&mut keys, key, now_ms() as i64);
        if let Some(state) = keys.get_mut(key) {
            state.trim(min_score, max_score);
        }
        Ok(())
    }

    async fn cardinality(&self, key: &str) -> Result<i64, RateLimitError> {
        let mut keys = self.keys.lock().expect("counting store lock poisoned");
        Self::sweep_expired(&mut keys, key, now_ms() as i64);
        Ok(keys.get(key).map_or(0, |s| s.entries.len() as i64))
    }

    async fn add(&self, key: &str, score: i64, member: &str) -> Result<(), RateLimitError> {
        let mut keys = self.keys.lock().expect("counting store lock poisoned");
        let state = keys.entry(key.to_string()).or_insert_with(KeyState::new);
        state.entries.push((score, member.to_string()));
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: i64) -> Result<(), RateLimitError> {
        let mut keys = self.keys.lock().expect("counting store lock poisoned");
        let now = now_ms() as i64;
        let state = keys.entry(key.to_string()).or_insert_with(KeyState::new);
        state.expires_at_ms = Some(now + seconds * 1000);
        Ok(())
    }

    async fn check_and_commit(
        &self,
        key: &str,
        window_start_ms: i64,
        now_ms_param: i64,
        limit: i64,
        member: &str,
        ttl_seconds: i64,
    ) -> Result<TxnOutcome, RateLimitError> {
        let mut keys = self.keys.lock().expect("counting store lock poisoned");
        Self::sweep_expired(&mut keys, key, now_ms_param);

        let state = keys.entry(key.to_string()).or_insert_with(KeyState::new);
        state.trim(0, window_start_ms.saturating_sub(1));
        let current = state.entries.len() as i64;

        if current >= limit {
            return Ok(TxnOutcome::Rejected { count: current });
        }

        state.entries.push((now_ms_param, member.to_string()));
        state.expires_at_ms = Some(now_ms_param + ttl_seconds * 1000);
        Ok(TxnOutcome::Committed { count: current + 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn admits_until_limit_then_rejects() {
        let store = InMemoryCountingStore::new();
        let now = 1_000_000_i64;
        for i in 0..3 {
            let outcome = store
                .check_and_commit("k", now - 60_000, now, 3, &format!("m{i}"), 120)
                .await
                .unwrap();
            assert!(matches!(outcome, TxnOutcome::Committed { .. }), "attempt {i}");
        }
        let outcome = store.check_and_commit("k", now - 60_000, now, 3, "m3", 120).await.unwrap();
        assert_eq!(outcome, TxnOutcome::Rejected { count: 3 });
    }

    #[tokio::test]
    async fn ttl_evicts_idle_key() {
        let store = InMemoryCountingStore::new();
        store.add("k", 0, "m0").await.unwrap();
        store.expire("k", 1).await.unwrap();
        assert_eq!(store.cardinality("k").await.unwrap(), 1);

        // Simulate TTL expiry by forcing a future now_ms through check_and_commit,
        // which sweeps expired keys before reading.
        let far_future = (now_ms() as i64) + 10_000;
        let outcome =
            store.check_and_commit("k", far_future - 60_000, far_future, 10, "m1", 120).await.unwrap();
        assert_eq!(outcome, TxnOutcome::Committed { count: 1 });
    }
}
