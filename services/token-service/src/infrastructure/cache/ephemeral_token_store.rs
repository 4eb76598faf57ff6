//! 短期 Token 存储
//!
//! 在 `CachePort` 之上按命名空间生成 key。过期完全交给底层存储的 TTL。

use labzang_errors::AppResult;
use labzang_ports::CachePort;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::keys::{TokenKind, TokenNamespace, authorization_code_key, token_key};

#[derive(Clone)]
pub struct EphemeralTokenStore {
    cache: Arc<dyn CachePort>,
}

impl EphemeralTokenStore {
    pub fn new(cache: Arc<dyn CachePort>) -> Self {
        Self { cache }
    }

    /// 写入 Token，已存在时覆盖并重新计算 TTL
    pub async fn set(
        &self,
        namespace: TokenNamespace,
        provider: &str,
        user_id: &str,
        kind: TokenKind,
        value: &str,
        ttl: Duration,
    ) -> AppResult<()> {
        let key = token_key(namespace, provider, user_id, kind);
        self.cache.set(&key, value, Some(ttl)).await?;
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Ephemeral token stored");
        Ok(())
    }

    pub async fn get(
        &self,
        namespace: TokenNamespace,
        provider: &str,
        user_id: &str,
        kind: TokenKind,
    ) -> AppResult<Option<String>> {
        let key = token_key(namespace, provider, user_id, kind);
        self.cache.get(&key).await
    }

    pub async fn delete(
        &self,
        namespace: TokenNamespace,
        provider: &str,
        user_id: &str,
        kind: TokenKind,
    ) -> AppResult<()> {
        let key = token_key(namespace, provider, user_id, kind);
        self.cache.delete(&key).await
    }

    /// 保存 Authorization Code 对应的 state
    pub async fn save_code(
        &self,
        provider: &str,
        code: &str,
        state: &str,
        ttl: Duration,
    ) -> AppResult<()> {
        let key = authorization_code_key(provider, code);
        self.cache.set(&key, state, Some(ttl)).await?;
        debug!(provider, ttl_secs = ttl.as_secs(), "Authorization code stored");
        Ok(())
    }

    /// 取出并删除 Authorization Code，一个 code 只会被取出一次
    pub async fn take_code(&self, provider: &str, code: &str) -> AppResult<Option<String>> {
        let key = authorization_code_key(provider, code);
        self.cache.take(&key).await
    }
}
