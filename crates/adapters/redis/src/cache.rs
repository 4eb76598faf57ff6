//! Redis Cache 实现

use async_trait::async_trait;
use labzang_errors::{AppError, AppResult};
use labzang_ports::CachePort;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::time::Duration;
use tracing::debug;

use crate::map_redis_error;

/// GET + DEL 在同一个脚本里执行，服务端串行化，同一个值只会被取走一次
const TAKE_SCRIPT: &str = r"
local value = redis.call('GET', KEYS[1])
if value then
    redis.call('DEL', KEYS[1])
end
return value
";

/// Redis Cache
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CachePort for RedisCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(|e| map_redis_error("get", e))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(duration) => {
                // Redis 拒绝 EX 0
                let secs = duration.as_secs();
                if secs == 0 {
                    return Err(AppError::validation(format!(
                        "TTL for key {} must be at least one second",
                        key
                    )));
                }
                conn.set_ex(key, value, secs)
                    .await
                    .map_err(|e| map_redis_error("set", e))
            }
            None => conn
                .set(key, value)
                .await
                .map_err(|e| map_redis_error("set", e)),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del(key).await.map_err(|e| map_redis_error("delete", e))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        conn.exists(key)
            .await
            .map_err(|e| map_redis_error("exists", e))
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = Script::new(TAKE_SCRIPT)
            .key(key)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("take", e))?;
        if value.is_none() {
            debug!("Take found no value");
        }
        Ok(value)
    }
}
