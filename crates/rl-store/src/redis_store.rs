//! Redis-backed [`CountingStore`].
//!
//! `check_and_commit` is implemented as a single server-side Lua script
//! (the "optimistic txn vs. server-side script" alternative named in spec
//! §9) rather than `WATCH`/`MULTI`/`EXEC`. A `WATCH`-based
//! transaction only isolates correctly when the whole `WATCH..EXEC` span
//! runs on a *dedicated* connection; this adapter's connection is a clone of
//! one shared `redis::aio::ConnectionManager` handed out to every concurrent
//! request (see `AppState`), and `EXEC` clears every key watched on that
//! physical connection regardless of which logical caller issued the
//! `WATCH`. Under concurrent requests that silently drops the
//! optimistic-concurrency check spec §4.3/§4.4 requires. A single `EVAL`
//! has no such connection-sharing hazard: Redis executes the whole script
//! atomically server-side, so `TxnOutcome::Conflict` is unreachable from
//! this implementation (the contract in §4.4 is otherwise unchanged).

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use rl_core::RateLimitError;
use tracing::debug;

use crate::{CountingStore, TxnOutcome};

/// `trim` the window, read cardinality, and — if under `limit` — `add` the
/// new member and refresh the TTL, all in one atomic server-side step.
///
/// `KEYS[1]` = counting-store key.
/// `ARGV[1]` = trim upper bound (`window_start_ms - 1`).
/// `ARGV[2]` = `now_ms`, the score for the new member.
/// `ARGV[3]` = `limit`.
/// `ARGV[4]` = unique member.
/// `ARGV[5]` = TTL in seconds.
///
/// Returns `{1, count}` on admit, `{0, count}` on reject.
const CHECK_AND_COMMIT_SCRIPT: &str = r"
redis.call('ZREMRANGEBYSCORE', KEYS[1], 0, ARGV[1])
local current = tonumber(redis.call('ZCARD', KEYS[1]))
if current >= tonumber(ARGV[3]) then
  return {0, current}
end
redis.call('ZADD', KEYS[1], ARGV[2], ARGV[4])
redis.call('EXPIRE', KEYS[1], ARGV[5])
return {1, current + 1}
";

/// A [`CountingStore`] backed by a Redis sorted set per key.
#[derive(Clone)]
pub struct RedisCountingStore {
    conn: ConnectionManager,
}

impl RedisCountingStore {
    /// Connect to `redis_url` (e.g. `redis://127.0.0.1:6379`) and build a
    /// managed connection that reconnects transparently on transport drops.
    pub async fn connect(redis_url: &str) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| RateLimitError::StoreUnavailable(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| RateLimitError::StoreUnavailable(format!("redis connect: {e}")))?;
        Ok(Self { conn })
    }
}

fn unavailable(e: redis::RedisError) -> RateLimitError {
    RateLimitError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl CountingStore for RedisCountingStore {
    async fn trim(&self, key: &str, min_score: i64, max_score: i64) -> Result<(), RateLimitError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.zrembyscore(key, min_score, max_score).await.map_err(unavailable)?;
        Ok(())
    }

    async fn cardinality(&self, key: &str) -> Result<i64, RateLimitError> {
        let mut conn = self.conn.clone();
        conn.zcard(key).await.map_err(unavailable)
    }

    async fn add(&self, key: &str, score: i64, member: &str) -> Result<(), RateLimitError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.zadd(key, member, score).await.map_err(unavailable)?;
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: i64) -> Result<(), RateLimitError> {
        let mut conn = self.conn.clone();
        let _: bool = conn.expire(key, seconds).await.map_err(unavailable)?;
        Ok(())
    }

    async fn check_and_commit(
        &self,
        key: &str,
        window_start_ms: i64,
        now_ms: i64,
        limit: i64,
        member: &str,
        ttl_seconds: i64,
    ) -> Result<TxnOutcome, RateLimitError> {
        let mut conn = self.conn.clone();

        let (admitted, count): (i64, i64) = redis::Script::new(CHECK_AND_COMMIT_SCRIPT)
            .key(key)
            .arg(window_start_ms.saturating_sub(1))
            .arg(now_ms)
            .arg(limit)
            .arg(member)
            .arg(ttl_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(unavailable)?;

        if admitted != 1 {
            debug!(key, count, "counting store rejected admission");
        }
        Ok(if admitted == 1 {
            TxnOutcome::Committed { count }
        } else {
            TxnOutcome::Rejected { count }
        })
    }
}
