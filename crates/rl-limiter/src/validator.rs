//! Request Validator (F): rejects malformed contexts before any catalog or
//! counting-store work happens.

use rl_core::{RateLimitError, RequestContext};

/// Reject `ctx` if `user_id` or `model_id` is missing or empty. All other
/// fields are optional and pass through untouched.
pub fn validate(ctx: &RequestContext) -> Result<(), RateLimitError> {
    if ctx.user_id.trim().is_empty() {
        return Err(RateLimitError::InvalidRequest("userId is required".to_string()));
    }
    if ctx.model_id.trim().is_empty() {
        return Err(RateLimitError::InvalidRequest("modelId is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(user_id: &str, model_id: &str) -> RequestContext {
        RequestContext {
            user_id: user_id.to_string(),
            model_id: model_id.to_string(),
            tenant_id: None,
            api_key: None,
            model_tier: None,
        }
    }

    #[test]
    fn accepts_minimal_valid_context() {
        assert!(validate(&ctx("u1", "gpt-4o")).is_ok());
    }

    #[test]
    fn rejects_empty_user_id() {
        let err = validate(&ctx("", "gpt-4o")).unwrap_err();
        assert!(matches!(err, RateLimitError::InvalidRequest(_)));
    }

    #[test]
    fn rejects_whitespace_only_model_id() {
        let err = validate(&ctx("u1", "   ")).unwrap_err();
        assert!(matches!(err, RateLimitError::InvalidRequest(_)));
    }
}
