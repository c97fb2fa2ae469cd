//! Decision Composer (E): evaluates every Effective Limit exactly once,
//! then selects the primary failure (on reject) or the tightest binding
//! success (on accept) and formats the structured cause.

use rl_core::{Decision, EffectiveLimit, FulfilledLimit, RateLimitError};
use rl_store::CountingStore;

use crate::counter::check_and_consume;

struct Evaluated<'a> {
    limit: &'a EffectiveLimit,
    count: i64,
    resolver_index: usize,
}

/// Evaluate every effective limit in `limits` (in resolver order) against
/// `store`, then compose the final [`Decision`].
///
/// Every limit is evaluated exactly once, even after the first failure, so
/// that broader-scoped counters are incremented and callers get a complete
/// picture of usage (`spec` §4.5 step 1 — "evaluate all").
pub async fn decide(
    limits: &[EffectiveLimit],
    store: &dyn CountingStore,
) -> Result<Decision, RateLimitError> {
    if limits.is_empty() {
        return Err(RateLimitError::NoPolicy);
    }

    let mut failures = Vec::new();
    let mut successes = Vec::new();

    for (resolver_index, limit) in limits.iter().enumerate() {
        let result = check_and_consume(store, &limit.key, limit.window_seconds, limit.limit).await?;
        if result.count == -1 {
            return Err(RateLimitError::StoreContention);
        }
        let evaluated = Evaluated { limit, count: result.count, resolver_index };
        if result.allowed {
            successes.push(evaluated);
        } else {
            failures.push(evaluated);
        }
    }

    if !failures.is_empty() {
        return Ok(compose_rejection(failures));
    }
    Ok(compose_admission(successes))
}

fn compose_rejection(mut failures: Vec<Evaluated<'_>>) -> Decision {
    failures.sort_by(|a, b| {
        b.limit
            .scope
            .precedence()
            .cmp(&a.limit.scope.precedence())
            .then(a.resolver_index.cmp(&b.resolver_index))
    });

    let primary = &failures[0];
    let mut cause = format!(
        "{} exceeded: {}/{} in the last {} seconds (key={})",
        primary.limit.label, primary.count, primary.limit.limit, primary.limit.window_seconds,
        primary.limit.key
    );
    if failures.len() > 1 {
        let rest: Vec<String> = failures[1..]
            .iter()
            .map(|f| format!("{} ({}/{})", f.limit.label, f.count, f.limit.limit))
            .collect();
        cause.push_str(&format!("; also violated: {}", rest.join(", ")));
    }

    Decision {
        allowed: false,
        limit: primary.limit.limit,
        count: primary.count,
        window_seconds: primary.limit.window_seconds,
        cause: Some(cause),
        fulfilled: None,
    }
}

fn compose_admission(mut successes: Vec<Evaluated<'_>>) -> Decision {
    successes.sort_by(|a, b| {
        let remaining_a = a.limit.limit - a.count;
        let remaining_b = b.limit.limit - b.count;
        remaining_a
            .cmp(&remaining_b)
            .then(b.limit.scope.precedence().cmp(&a.limit.scope.precedence()))
            .then(a.resolver_index.cmp(&b.resolver_index))
    });

    let primary = &successes[0];
    let fulfilled: Vec<FulfilledLimit> = {
        let mut ordered: Vec<&Evaluated<'_>> = successes.iter().collect();
        ordered.sort_by_key(|e| e.resolver_index);
        ordered
            .into_iter()
            .map(|e| FulfilledLimit {
                label: e.limit.label.clone(),
                key: e.limit.key.clone(),
                limit: e.limit.limit,
                count: e.count,
                window_seconds: e.limit.window_seconds,
            })
            .collect()
    };

    Decision {
        allowed: true,
        limit: primary.limit.limit,
        count: primary.count,
        window_seconds: primary.limit.window_seconds,
        cause: None,
        fulfilled: Some(fulfilled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_core::Scope;
    use rl_store::InMemoryCountingStore;

    fn limit(key: &str, scope: Scope, window_seconds: i64, limit: i64) -> EffectiveLimit {
        EffectiveLimit { key: key.to_string(), window_seconds, limit, label: scope.label().to_string(), scope }
    }

    #[tokio::test]
    async fn empty_limits_is_no_policy() {
        let store = InMemoryCountingStore::new();
        let err = decide(&[], &store).await.unwrap_err();
        assert!(matches!(err, RateLimitError::NoPolicy));
    }

    #[tokio::test]
    async fn single_global_policy_admits_first_request() {
        let store = InMemoryCountingStore::new();
        let limits = vec![limit("rl:global", Scope::Global, 60, 10)];
        let decision = decide(&limits, &store).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.count, 1);
        assert_eq!(decision.limit, 10);
        let fulfilled = decision.fulfilled.unwrap();
        assert_eq!(fulfilled.len(), 1);
        assert_eq!(fulfilled[0].label, "GLOBAL");
        assert_eq!(fulfilled[0].count, 1);
    }

    #[tokio::test]
    async fn reject_on_most_specific_still_increments_broader_counters() {
        let store = InMemoryCountingStore::new();
        let user_model = limit("rl:user:3:model:1", Scope::UserModel, 60, 5);
        let model = limit("rl:model:1", Scope::Model, 60, 100);

        for _ in 0..5 {
            check_and_consume(&store, &user_model.key, 60, 5).await.unwrap();
        }
        for _ in 0..10 {
            check_and_consume(&store, &model.key, 60, 100).await.unwrap();
        }

        let limits = vec![user_model.clone(), model.clone()];
        let decision = decide(&limits, &store).await.unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.count, 5);
        assert_eq!(decision.limit, 5);
        assert!(decision.cause.as_ref().unwrap().starts_with("USER_MODEL exceeded: 5/5 in the last 60 seconds"));

        let model_count = CountingStore::cardinality(&store, &model.key).await.unwrap();
        assert_eq!(model_count, 11);
    }

    #[tokio::test]
    async fn admits_select_tightest_remaining() {
        let store = InMemoryCountingStore::new();
        let tier = limit("rl:modeltier:1", Scope::ModelTier, 60, 100);
        let tenant = limit("rl:tenant:1", Scope::Tenant, 60, 50);

        for _ in 0..9 {
            check_and_consume(&store, &tier.key, 60, 100).await.unwrap();
        }
        for _ in 0..39 {
            check_and_consume(&store, &tenant.key, 60, 50).await.unwrap();
        }

        let limits = vec![tier, tenant];
        let decision = decide(&limits, &store).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.limit, 50);
        assert_eq!(decision.count, 40);
    }
}
