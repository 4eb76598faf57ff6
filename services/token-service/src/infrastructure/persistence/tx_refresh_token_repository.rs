//! 事务感知的 Refresh Token 仓储
//!
//! 与所在 Unit of Work 共享同一个 Transaction。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labzang_errors::{AppError, AppResult};
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::refresh_token_sql as sql;
use crate::domain::entities::{NewRefreshToken, RefreshTokenRecord};
use crate::domain::repositories::RefreshTokenRepository;

/// 共享事务类型
pub type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

pub struct TxRefreshTokenRepository {
    tx: SharedTx,
}

impl TxRefreshTokenRepository {
    pub fn new(tx: SharedTx) -> Self {
        Self { tx }
    }
}

fn consumed() -> AppError {
    AppError::internal("Transaction consumed")
}

#[async_trait]
impl RefreshTokenRepository for TxRefreshTokenRepository {
    async fn find_by_provider_and_user(
        &self,
        provider: &str,
        user_id: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(consumed)?;
        sql::find_by_provider_and_user(&mut **tx, provider, user_id).await
    }

    async fn delete_by_provider_and_user(&self, provider: &str, user_id: &str) -> AppResult<u64> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(consumed)?;
        sql::delete_by_provider_and_user(&mut **tx, provider, user_id).await
    }

    async fn save(&self, token: &NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(consumed)?;
        sql::insert(&mut **tx, token).await
    }

    async fn delete_through(&self, record: &RefreshTokenRecord) -> AppResult<u64> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(consumed)?;
        sql::delete_through(&mut **tx, record).await
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<u64> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(consumed)?;
        sql::delete_by_id(&mut **tx, id).await
    }

    async fn delete_expired_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(consumed)?;
        sql::delete_expired_before(&mut **tx, before).await
    }
}
