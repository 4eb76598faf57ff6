//! 数据库迁移

use labzang_adapter_postgres::{Migration, MigrationManager, MigrationResult};
use labzang_errors::AppResult;
use sqlx::PgPool;

const CREATE_REFRESH_TOKENS: &str = r#"
CREATE TABLE IF NOT EXISTS refresh_tokens (
    id            BIGSERIAL PRIMARY KEY,
    provider      VARCHAR(50) NOT NULL,
    user_id       VARCHAR(255) NOT NULL,
    refresh_token TEXT NOT NULL,
    expires_at    TIMESTAMPTZ NOT NULL,
    created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_refresh_tokens_provider_user ON refresh_tokens (provider, user_id);
CREATE INDEX IF NOT EXISTS idx_refresh_tokens_expires_at ON refresh_tokens (expires_at);
"#;

/// 本服务的全部迁移，按版本递增
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new(1, "create_refresh_tokens", CREATE_REFRESH_TOKENS)]
}

/// 执行待处理的迁移
pub async fn run_migrations(pool: PgPool) -> AppResult<MigrationResult> {
    MigrationManager::new(pool).migrate(&migrations()).await
}
