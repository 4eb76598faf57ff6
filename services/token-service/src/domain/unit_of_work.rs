//! Unit of Work 模式
//!
//! 让多次仓储调用落在同一个事务里。

use async_trait::async_trait;
use labzang_errors::AppResult;

use crate::domain::repositories::RefreshTokenRepository;

/// Unit of Work trait
///
/// ```ignore
/// let uow = uow_factory.begin().await?;
/// uow.refresh_tokens().delete_by_provider_and_user("kakao", "42").await?;
/// uow.refresh_tokens().save(&new_token).await?;
/// uow.commit().await?;
/// ```
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 事务内的 Refresh Token 仓储
    fn refresh_tokens(&self) -> &dyn RefreshTokenRepository;

    /// 提交事务
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的事务
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}
