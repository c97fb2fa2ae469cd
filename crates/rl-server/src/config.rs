//! Process configuration, read from the environment (with `.env` loading
//! via `dotenvy` for local development, as the teacher pack's web server
//! does).

use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TIMEOUT_MS: u64 = 250;

/// Process-wide configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres DSN for the policy catalog.
    pub pg_dsn: String,
    /// Redis endpoint for the counting store.
    pub redis_url: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Allowed CORS origins; empty means permissive (development default).
    pub cors_origins: Vec<String>,
    /// Per-operation deadline for catalog lookups.
    pub catalog_timeout: Duration,
    /// Per-operation deadline for counting-store calls.
    pub store_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment, loading a local
    /// `.env` file first if present.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let cors_origins = std::env::var("RL_CORS_ORIGINS")
            .ok()
            .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
            .unwrap_or_default();

        Self {
            pg_dsn: std::env::var("RL_PG_DSN").unwrap_or_default(),
            redis_url: std::env::var("RL_REDIS_URL").unwrap_or_default(),
            bind_addr: std::env::var("RL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            cors_origins,
            catalog_timeout: Duration::from_millis(env_u64("RL_CATALOG_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)),
            store_timeout: Duration::from_millis(env_u64("RL_STORE_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // `std::env::set_var`/`remove_var` mutate process-wide state; Cargo runs
    // tests in this file on multiple threads by default, so every test that
    // reads or writes `RL_*` env vars must hold this lock for its duration.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn cors_origins_splits_and_trims_comma_list() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        std::env::set_var("RL_CORS_ORIGINS", " https://a.example , https://b.example");
        let cfg = Config::from_env();
        assert_eq!(cfg.cors_origins, vec!["https://a.example", "https://b.example"]);
        std::env::remove_var("RL_CORS_ORIGINS");
    }

    #[test]
    fn timeouts_default_to_250ms() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        std::env::remove_var("RL_CATALOG_TIMEOUT_MS");
        std::env::remove_var("RL_STORE_TIMEOUT_MS");
        let cfg = Config::from_env();
        assert_eq!(cfg.catalog_timeout, Duration::from_millis(250));
        assert_eq!(cfg.store_timeout, Duration::from_millis(250));
    }
}
