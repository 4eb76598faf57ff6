//! refresh_tokens 表的 SQL
//!
//! 对连接池和事务都适用，泛型参数是 sqlx 的 executor。

use chrono::{DateTime, Utc};
use labzang_adapter_postgres::map_sqlx_error;
use labzang_errors::AppResult;
use sqlx::PgExecutor;

use crate::domain::entities::{NewRefreshToken, RefreshTokenRecord};

#[derive(sqlx::FromRow)]
pub(crate) struct RefreshTokenRow {
    pub id: i64,
    pub provider: String,
    pub user_id: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshTokenRecord {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            id: row.id,
            provider: row.provider,
            user_id: row.user_id,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

pub(crate) async fn find_by_provider_and_user<'e, E>(
    executor: E,
    provider: &str,
    user_id: &str,
) -> AppResult<Option<RefreshTokenRecord>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, RefreshTokenRow>(
        r#"
        SELECT id, provider, user_id, refresh_token, expires_at, created_at
        FROM refresh_tokens
        WHERE provider = $1 AND user_id = $2
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(provider)
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map_err(|e| map_sqlx_error("Failed to find refresh token", e))?;

    Ok(row.map(Into::into))
}

pub(crate) async fn delete_by_provider_and_user<'e, E>(
    executor: E,
    provider: &str,
    user_id: &str,
) -> AppResult<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE provider = $1 AND user_id = $2")
        .bind(provider)
        .bind(user_id)
        .execute(executor)
        .await
        .map_err(|e| map_sqlx_error("Failed to delete refresh token", e))?;

    Ok(result.rows_affected())
}

pub(crate) async fn insert<'e, E>(
    executor: E,
    token: &NewRefreshToken,
) -> AppResult<RefreshTokenRecord>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, RefreshTokenRow>(
        r#"
        INSERT INTO refresh_tokens (provider, user_id, refresh_token, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, provider, user_id, refresh_token, expires_at, created_at
        "#,
    )
    .bind(&token.provider)
    .bind(&token.user_id)
    .bind(&token.refresh_token)
    .bind(token.expires_at)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
    .map_err(|e| map_sqlx_error("Failed to save refresh token", e))?;

    Ok(row.into())
}

pub(crate) async fn delete_through<'e, E>(
    executor: E,
    record: &RefreshTokenRecord,
) -> AppResult<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM refresh_tokens
        WHERE provider = $1 AND user_id = $2 AND (created_at, id) <= ($3, $4)
        "#,
    )
    .bind(&record.provider)
    .bind(&record.user_id)
    .bind(record.created_at)
    .bind(record.id)
    .execute(executor)
    .await
    .map_err(|e| map_sqlx_error("Failed to delete superseded refresh tokens", e))?;

    Ok(result.rows_affected())
}

pub(crate) async fn delete_by_id<'e, E>(executor: E, id: i64) -> AppResult<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| map_sqlx_error("Failed to delete refresh token", e))?;

    Ok(result.rows_affected())
}

pub(crate) async fn delete_expired_before<'e, E>(
    executor: E,
    before: DateTime<Utc>,
) -> AppResult<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
        .bind(before)
        .execute(executor)
        .await
        .map_err(|e| map_sqlx_error("Failed to delete expired refresh tokens", e))?;

    Ok(result.rows_affected())
}
