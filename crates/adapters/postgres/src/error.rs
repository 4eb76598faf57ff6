//! sqlx 错误分类

use labzang_errors::AppError;

/// 将 sqlx 错误转换为应用错误
///
/// 连接层错误（I/O、TLS、连接池超时或已关闭）归为 `StorageUnavailable`，其余为 `Database`。
pub fn map_sqlx_error(context: &str, err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            AppError::storage_unavailable(format!("{}: {}", context, err))
        }
        other => AppError::database(format!("{}: {}", context, other)),
    }
}
