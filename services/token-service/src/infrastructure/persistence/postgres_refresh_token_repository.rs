use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labzang_errors::AppResult;
use sqlx::PgPool;
use tracing::debug;

use super::refresh_token_sql as sql;
use crate::domain::entities::{NewRefreshToken, RefreshTokenRecord};
use crate::domain::repositories::RefreshTokenRepository;

/// 直接使用连接池的仓储，每次调用各自提交
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn find_by_provider_and_user(
        &self,
        provider: &str,
        user_id: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        debug!(provider, user_id, "Finding refresh token");
        sql::find_by_provider_and_user(&self.pool, provider, user_id).await
    }

    async fn delete_by_provider_and_user(&self, provider: &str, user_id: &str) -> AppResult<u64> {
        sql::delete_by_provider_and_user(&self.pool, provider, user_id).await
    }

    async fn save(&self, token: &NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        debug!(provider = %token.provider, user_id = %token.user_id, "Saving refresh token");
        sql::insert(&self.pool, token).await
    }

    async fn delete_through(&self, record: &RefreshTokenRecord) -> AppResult<u64> {
        sql::delete_through(&self.pool, record).await
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<u64> {
        sql::delete_by_id(&self.pool, id).await
    }

    async fn delete_expired_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        sql::delete_expired_before(&self.pool, before).await
    }
}
