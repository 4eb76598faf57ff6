//! Redis 错误分类

use labzang_errors::AppError;
use redis::RedisError;

/// 将 Redis 错误转换为应用错误
///
/// 连接类错误（I/O、拒绝连接、连接断开、超时）归为 `StorageUnavailable`，其余为 `Internal`。
pub fn map_redis_error(operation: &str, err: RedisError) -> AppError {
    if is_unavailable(&err) {
        AppError::storage_unavailable(format!("Redis {} failed: {}", operation, err))
    } else {
        AppError::internal(format!("Redis {} failed: {}", operation, err))
    }
}

fn is_unavailable(err: &RedisError) -> bool {
    err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout()
}
