//! Redis 连接管理

use labzang_errors::AppResult;
use redis::Client;
use redis::aio::ConnectionManager;
use tracing::{debug, error};

use crate::map_redis_error;

/// 创建 Redis 连接管理器
///
/// `ConnectionManager` 可廉价 clone，断线后自动重连；由调用方显式持有并注入，不做全局单例。
pub async fn create_connection_manager(url: &str) -> AppResult<ConnectionManager> {
    let client = Client::open(url).map_err(|e| map_redis_error("client open", e))?;

    ConnectionManager::new(client)
        .await
        .map_err(|e| map_redis_error("connect", e))
}

/// 检查 Redis 连接
pub async fn check_connection(conn: &mut ConnectionManager) -> AppResult<()> {
    match redis::cmd("PING").query_async::<String>(conn).await {
        Ok(_) => {
            debug!("Redis health check passed");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Redis health check failed");
            Err(map_redis_error("health check", e))
        }
    }
}
