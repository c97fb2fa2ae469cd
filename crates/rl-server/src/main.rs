use std::sync::Arc;

use rl_catalog::PgCatalogStore;
use rl_server::config::Config;
use rl_server::routes::router;
use rl_store::RedisCountingStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rl_telemetry::init_json_logging().ok();

    let cfg = Config::from_env();
    tracing::info!(bind_addr = %cfg.bind_addr, "starting rate limiting decision service");

    let catalog = PgCatalogStore::connect(&cfg.pg_dsn).await?;
    let store = RedisCountingStore::connect(&cfg.redis_url).await?;

    let state = rl_server::build_state(Arc::new(catalog), Arc::new(store), &cfg);
    let app = router(state).layer(rl_server::cors_layer(&cfg));

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(bind_addr = %cfg.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
