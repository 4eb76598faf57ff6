//! Token 存储门面
//!
//! 调用方唯一的入口。短期 Token 走 `EphemeralTokenStore`，Refresh Token 走 PostgreSQL。
//! 所有存储错误直接向上返回，不重试。

use chrono::{DateTime, TimeDelta, Utc};
use labzang_errors::{AppError, AppResult};
use labzang_ports::CachePort;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::entities::NewRefreshToken;
use crate::domain::keys::{TokenKind, TokenNamespace};
use crate::domain::repositories::RefreshTokenRepository;
use crate::domain::unit_of_work::UnitOfWorkFactory;
use crate::infrastructure::cache::EphemeralTokenStore;

pub struct TokenService {
    ephemeral: EphemeralTokenStore,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl TokenService {
    pub fn new(
        cache: Arc<dyn CachePort>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        uow_factory: Arc<dyn UnitOfWorkFactory>,
    ) -> Self {
        Self {
            ephemeral: EphemeralTokenStore::new(cache),
            refresh_tokens,
            uow_factory,
        }
    }

    // ============ Session Token ============

    /// 保存会话 Access Token（Redis，`token:{provider}:{user_id}:access`）
    pub async fn save_access_token(
        &self,
        provider: &str,
        user_id: &str,
        access_token: &str,
        ttl_secs: u64,
    ) -> AppResult<()> {
        record_operation("save_access_token");
        let ttl = ephemeral_ttl(ttl_secs)?;
        self.ephemeral
            .set(
                TokenNamespace::Session,
                provider,
                user_id,
                TokenKind::Access,
                access_token,
                ttl,
            )
            .await?;
        info!(provider, user_id, ttl_secs, "Access token saved");
        Ok(())
    }

    pub async fn get_access_token(&self, provider: &str, user_id: &str) -> AppResult<Option<String>> {
        record_operation("get_access_token");
        self.ephemeral
            .get(TokenNamespace::Session, provider, user_id, TokenKind::Access)
            .await
    }

    /// 保存 Refresh Token（PostgreSQL）
    ///
    /// 同一事务内先删除该用户的旧记录再插入新记录，任一步失败都会回滚。
    pub async fn save_refresh_token(
        &self,
        provider: &str,
        user_id: &str,
        refresh_token: &str,
        ttl_secs: u64,
    ) -> AppResult<()> {
        record_operation("save_refresh_token");
        let expires_at = expires_at(Utc::now(), ttl_secs)?;
        let new_token = NewRefreshToken::new(provider, user_id, refresh_token, expires_at);

        let uow = self.uow_factory.begin().await?;
        let replaced = async {
            let removed = uow
                .refresh_tokens()
                .delete_by_provider_and_user(provider, user_id)
                .await?;
            uow.refresh_tokens().save(&new_token).await?;
            Ok::<_, AppError>(removed)
        }
        .await;

        match replaced {
            Ok(removed) => {
                uow.commit().await?;
                info!(provider, user_id, %expires_at, replaced = removed, "Refresh token saved");
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(error = %rollback_err, "Failed to rollback refresh token save");
                }
                Err(e)
            }
        }
    }

    /// 读取 Refresh Token
    ///
    /// 以最新一条记录为准。它已过期时，它和更早的记录在这里被删除，并按不存在返回。
    pub async fn get_refresh_token(&self, provider: &str, user_id: &str) -> AppResult<Option<String>> {
        record_operation("get_refresh_token");
        let Some(record) = self
            .refresh_tokens
            .find_by_provider_and_user(provider, user_id)
            .await?
        else {
            return Ok(None);
        };

        if !record.is_expired_at(Utc::now()) {
            debug!(provider, user_id, "Refresh token found");
            return Ok(Some(record.refresh_token));
        }

        // 最新一条已过期时，更早的记录同样作废
        let removed = self.refresh_tokens.delete_through(&record).await?;
        counter!("token_store_expired_refresh_tokens_total", "reason" => "lazy").increment(removed);
        info!(provider, user_id, removed, "Expired refresh token deleted");
        Ok(None)
    }

    /// 删除会话 Access Token 和 Refresh Token
    ///
    /// 两个存储之间没有分布式事务。先删 PostgreSQL：失败时 Redis 保持不动；
    /// PostgreSQL 成功而 Redis 失败时错误返回给调用方，残留的 Access Token 最迟在 TTL 到期时消失。
    /// 整个操作幂等，可以直接重试。
    pub async fn delete_tokens(&self, provider: &str, user_id: &str) -> AppResult<()> {
        record_operation("delete_tokens");
        let removed = self
            .refresh_tokens
            .delete_by_provider_and_user(provider, user_id)
            .await?;

        if let Err(e) = self
            .ephemeral
            .delete(TokenNamespace::Session, provider, user_id, TokenKind::Access)
            .await
        {
            warn!(
                provider,
                user_id,
                error = %e,
                "Refresh token deleted but access token delete failed"
            );
            return Err(e);
        }

        info!(provider, user_id, refresh_tokens_removed = removed, "Tokens deleted");
        Ok(())
    }

    // ============ Authorization Code ============

    /// 保存 Authorization Code，值为 state（未提供时为空字符串）
    pub async fn save_authorization_code(
        &self,
        provider: &str,
        code: &str,
        state: Option<&str>,
        ttl_secs: u64,
    ) -> AppResult<()> {
        record_operation("save_authorization_code");
        let ttl = ephemeral_ttl(ttl_secs)?;
        self.ephemeral
            .save_code(provider, code, state.unwrap_or_default(), ttl)
            .await
    }

    /// 校验并消费 Authorization Code，返回 state
    ///
    /// 读取和删除是一次原子操作，并发调用时只有一个调用方能拿到 state。
    pub async fn verify_and_delete_authorization_code(
        &self,
        provider: &str,
        code: &str,
    ) -> AppResult<Option<String>> {
        record_operation("verify_and_delete_authorization_code");
        let state = self.ephemeral.take_code(provider, code).await?;
        if state.is_none() {
            debug!(provider, "Authorization code not found or already used");
        }
        Ok(state)
    }

    // ============ OAuth Provider Token ============

    /// 保存 OAuth 提供方返回的原始 Access Token
    pub async fn save_oauth_access_token(
        &self,
        provider: &str,
        user_id: &str,
        access_token: &str,
        ttl_secs: u64,
    ) -> AppResult<()> {
        record_operation("save_oauth_access_token");
        self.save_oauth_token(provider, user_id, TokenKind::Access, access_token, ttl_secs)
            .await
    }

    /// 保存 OAuth 提供方返回的原始 Refresh Token
    pub async fn save_oauth_refresh_token(
        &self,
        provider: &str,
        user_id: &str,
        refresh_token: &str,
        ttl_secs: u64,
    ) -> AppResult<()> {
        record_operation("save_oauth_refresh_token");
        self.save_oauth_token(provider, user_id, TokenKind::Refresh, refresh_token, ttl_secs)
            .await
    }

    pub async fn get_oauth_access_token(
        &self,
        provider: &str,
        user_id: &str,
    ) -> AppResult<Option<String>> {
        record_operation("get_oauth_access_token");
        self.ephemeral
            .get(TokenNamespace::OAuth, provider, user_id, TokenKind::Access)
            .await
    }

    pub async fn get_oauth_refresh_token(
        &self,
        provider: &str,
        user_id: &str,
    ) -> AppResult<Option<String>> {
        record_operation("get_oauth_refresh_token");
        self.ephemeral
            .get(TokenNamespace::OAuth, provider, user_id, TokenKind::Refresh)
            .await
    }

    /// 删除 OAuth 原始 Access / Refresh Token
    pub async fn delete_oauth_tokens(&self, provider: &str, user_id: &str) -> AppResult<()> {
        record_operation("delete_oauth_tokens");
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            self.ephemeral
                .delete(TokenNamespace::OAuth, provider, user_id, kind)
                .await?;
        }
        info!(provider, user_id, "OAuth tokens deleted");
        Ok(())
    }

    // ============ Maintenance ============

    /// 批量删除所有已过期的 Refresh Token，返回删除条数
    pub async fn purge_expired_refresh_tokens(&self) -> AppResult<u64> {
        record_operation("purge_expired_refresh_tokens");
        let removed = self.refresh_tokens.delete_expired_before(Utc::now()).await?;
        counter!("token_store_expired_refresh_tokens_total", "reason" => "sweep").increment(removed);
        Ok(removed)
    }

    async fn save_oauth_token(
        &self,
        provider: &str,
        user_id: &str,
        kind: TokenKind,
        token: &str,
        ttl_secs: u64,
    ) -> AppResult<()> {
        let ttl = ephemeral_ttl(ttl_secs)?;
        self.ephemeral
            .set(TokenNamespace::OAuth, provider, user_id, kind, token, ttl)
            .await?;
        info!(provider, user_id, kind = %kind, ttl_secs, "OAuth token saved");
        Ok(())
    }
}

fn record_operation(operation: &'static str) {
    counter!("token_store_operations_total", "operation" => operation).increment(1);
}

/// 与 Refresh Token 使用同一个取值范围
fn ephemeral_ttl(ttl_secs: u64) -> AppResult<Duration> {
    expires_at(Utc::now(), ttl_secs)?;
    Ok(Duration::from_secs(ttl_secs))
}

fn expires_at(now: DateTime<Utc>, ttl_secs: u64) -> AppResult<DateTime<Utc>> {
    if ttl_secs == 0 {
        return Err(AppError::validation("TTL must be at least one second"));
    }
    i64::try_from(ttl_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AppError::validation(format!("TTL of {} seconds is out of range", ttl_secs)))
}
