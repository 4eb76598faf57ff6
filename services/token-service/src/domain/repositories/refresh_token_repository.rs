//! Refresh Token 仓储接口

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labzang_errors::AppResult;

use crate::domain::entities::{NewRefreshToken, RefreshTokenRecord};

/// Refresh Token 仓储接口
///
/// 表上没有 (provider, user_id) 唯一约束，"每个用户至多一条" 由先删后插保证。
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// 根据 provider 和 user_id 查找（存在多条时取最新一条）
    async fn find_by_provider_and_user(
        &self,
        provider: &str,
        user_id: &str,
    ) -> AppResult<Option<RefreshTokenRecord>>;

    /// 删除该用户的记录，返回删除条数
    async fn delete_by_provider_and_user(&self, provider: &str, user_id: &str) -> AppResult<u64>;

    /// 插入新记录，`created_at` 在这里写入
    async fn save(&self, token: &NewRefreshToken) -> AppResult<RefreshTokenRecord>;

    /// 删除该用户中不晚于 `record` 的记录（按 `created_at`, `id` 排序），返回删除条数
    ///
    /// 之后插入的新记录不受影响。
    async fn delete_through(&self, record: &RefreshTokenRecord) -> AppResult<u64>;

    /// 根据 id 删除
    async fn delete_by_id(&self, id: i64) -> AppResult<u64>;

    /// 删除 `expires_at <= before` 的记录
    async fn delete_expired_before(&self, before: DateTime<Utc>) -> AppResult<u64>;
}
