//! Cache trait 定义

use async_trait::async_trait;
use labzang_errors::AppResult;
use std::time::Duration;

/// 带 TTL 的键值存储
///
/// 单个 key 的 set / get / delete 由存储保证原子性；过期由存储负责，调用方不再二次校验。
#[async_trait]
pub trait CachePort: Send + Sync {
    /// 获取缓存值
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置缓存值，无条件覆盖，TTL 重新计时
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 删除缓存，key 不存在时不报错
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 检查是否存在
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// 原子地读取并删除
    ///
    /// 并发调用时同一个值最多被一个调用方拿到。
    async fn take(&self, key: &str) -> AppResult<Option<String>>;
}
