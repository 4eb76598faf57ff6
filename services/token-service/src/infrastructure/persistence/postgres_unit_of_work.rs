//! PostgreSQL Unit of Work 实现

use async_trait::async_trait;
use labzang_adapter_postgres::map_sqlx_error;
use labzang_errors::{AppError, AppResult};
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::tx_refresh_token_repository::{SharedTx, TxRefreshTokenRepository};
use crate::domain::repositories::RefreshTokenRepository;
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

/// PostgreSQL Unit of Work 工厂
pub struct PostgresUnitOfWorkFactory {
    pool: PgPool,
}

impl PostgresUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }
}

/// 持有一个事务；未提交就被 drop 时由 sqlx 回滚
pub struct PostgresUnitOfWork {
    tx: SharedTx,
    refresh_token_repo: TxRefreshTokenRepository,
}

impl PostgresUnitOfWork {
    fn new(tx: Transaction<'static, Postgres>) -> Self {
        let tx = Arc::new(Mutex::new(Some(tx)));

        Self {
            refresh_token_repo: TxRefreshTokenRepository::new(tx.clone()),
            tx,
        }
    }

    async fn take_tx(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.tx
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    fn refresh_tokens(&self) -> &dyn RefreshTokenRepository {
        &self.refresh_token_repo
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.take_tx()
            .await?
            .commit()
            .await
            .map_err(|e| map_sqlx_error("Failed to commit transaction", e))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.take_tx()
            .await?
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("Failed to rollback transaction", e))
    }
}
