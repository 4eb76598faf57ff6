//! Refresh Token 实体

use chrono::{DateTime, Utc};
use std::fmt;

/// 已持久化的 Refresh Token
///
/// 只整体替换，不做原地更新。`created_at` 由仓储在插入时写入。
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub id: i64,
    pub provider: String,
    pub user_id: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// `now >= expires_at` 即视为失效
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for RefreshTokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRecord")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .field("user_id", &self.user_id)
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// 待插入的 Refresh Token
#[derive(Clone)]
pub struct NewRefreshToken {
    pub provider: String,
    pub user_id: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl NewRefreshToken {
    pub fn new(
        provider: impl Into<String>,
        user_id: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            provider: provider.into(),
            user_id: user_id.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    /// 补上仓储分配的 id 和创建时间
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> RefreshTokenRecord {
        RefreshTokenRecord {
            id,
            provider: self.provider,
            user_id: self.user_id,
            refresh_token: self.refresh_token,
            expires_at: self.expires_at,
            created_at,
        }
    }
}

impl fmt::Debug for NewRefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewRefreshToken")
            .field("provider", &self.provider)
            .field("user_id", &self.user_id)
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
