//! Shared data model and error types for the rate limiting decision service.
//!
//! This crate has no knowledge of HTTP, Postgres, or Redis; it only defines
//! the vocabulary every other crate in the workspace speaks.

#![deny(unsafe_code)]

pub mod error;
pub mod ids;
pub mod types;

pub use error::RateLimitError;
pub use types::{Decision, EffectiveLimit, FulfilledLimit, Policy, RequestContext, Scope};
