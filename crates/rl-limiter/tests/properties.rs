//! Property-based invariant tests for the sliding-window counter (P1, P2)
//! and TTL eviction (P7).

use proptest::prelude::*;
use rl_limiter::counter::check_and_consume;
use rl_store::{CountingStore, InMemoryCountingStore};

fn run<T>(f: impl std::future::Future<Output = T>) -> T {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
}

proptest! {
    /// P1: across any sequence of admit attempts against one key, the
    /// number admitted never exceeds the configured limit.
    #[test]
    fn p1_admits_never_exceed_limit(attempts in 1usize..50, limit in 1i64..20) {
        run(async move {
            let store = InMemoryCountingStore::new();
            let mut admitted = 0i64;
            for _ in 0..attempts {
                let r = check_and_consume(&store, "p1", 60, limit).await.unwrap();
                if r.allowed {
                    admitted += 1;
                }
            }
            prop_assert!(admitted <= limit);
            Ok(())
        })?;
    }

    /// P2: admitted counts form the contiguous range [1..k] in commit order.
    #[test]
    fn p2_admitted_counts_are_contiguous(attempts in 1usize..30) {
        run(async move {
            let store = InMemoryCountingStore::new();
            let mut seen = Vec::new();
            for _ in 0..attempts {
                let r = check_and_consume(&store, "p2", 60, 1000).await.unwrap();
                prop_assert!(r.allowed);
                seen.push(r.count);
            }
            let expected: Vec<i64> = (1..=attempts as i64).collect();
            prop_assert_eq!(seen, expected);
            Ok(())
        })?;
    }
}

#[tokio::test]
async fn p7_key_cardinality_is_zero_after_ttl_elapses() {
    let store = InMemoryCountingStore::new();
    let now = 1_000_000_i64;
    let window_seconds = 60_i64;
    let ttl_seconds = window_seconds * 2;

    let outcome = store
        .check_and_commit("p7", now - window_seconds * 1000, now, 5, "m0", ttl_seconds)
        .await
        .unwrap();
    assert!(matches!(outcome, rl_store::TxnOutcome::Committed { count: 1 }));

    // Any store call past the key's TTL sweeps it away first.
    let after_ttl = now + ttl_seconds * 1000 + 1;
    let outcome = store
        .check_and_commit(
            "p7",
            after_ttl - window_seconds * 1000,
            after_ttl,
            5,
            "m1",
            ttl_seconds,
        )
        .await
        .unwrap();
    assert_eq!(outcome, rl_store::TxnOutcome::Committed { count: 1 });
}
