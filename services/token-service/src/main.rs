//! Labzang Token 服务

use std::sync::Arc;
use std::time::Duration;

use labzang_bootstrap::{Infrastructure, init_runtime, shutdown_signal};
use labzang_config::AppConfig;
use labzang_telemetry::init_metrics;
use labzang_token::api::{self, AppState};
use labzang_token::application::TokenService;
use labzang_token::infrastructure::cleanup::ExpiredTokenCleanup;
use labzang_token::infrastructure::persistence::{
    PostgresRefreshTokenRepository, PostgresUnitOfWorkFactory, run_migrations,
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // 加载配置
    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let config = AppConfig::load(&config_dir)?;

    init_runtime(&config);
    let metrics = init_metrics()?;

    // 存储连接（启动期带重试）
    let infra = Infrastructure::from_config(&config).await?;

    let migrations = run_migrations(infra.postgres_pool()).await?;
    info!(
        applied = migrations.applied_count(),
        skipped = migrations.skipped.len(),
        "Database migrations finished"
    );

    let pool = infra.postgres_pool();
    let tokens = Arc::new(TokenService::new(
        Arc::new(infra.redis_cache()),
        Arc::new(PostgresRefreshTokenRepository::new(pool.clone())),
        Arc::new(PostgresUnitOfWorkFactory::new(pool)),
    ));

    // 过期 Refresh Token 清理
    let shutdown = CancellationToken::new();
    let cleanup = Arc::new(ExpiredTokenCleanup::new(
        tokens,
        Duration::from_secs(config.token.cleanup_interval_secs),
    ))
    .start(shutdown.clone());

    let state = Arc::new(AppState {
        infra: infra.clone(),
        metrics,
    });
    let app = api::router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, service = %config.app_name, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    if let Err(e) = cleanup.await {
        tracing::warn!(error = %e, "Cleanup task did not stop cleanly");
    }
    infra.close().await;

    info!("Service stopped");
    Ok(())
}
