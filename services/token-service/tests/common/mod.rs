//! 测试用的内存存储实现

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labzang_errors::{AppError, AppResult};
use labzang_ports::CachePort;
use labzang_token::application::TokenService;
use labzang_token::domain::{
    NewRefreshToken, RefreshTokenRecord, RefreshTokenRepository, UnitOfWork, UnitOfWorkFactory,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ============ Cache ============

#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, (String, Option<Instant>)>>,
    unavailable: AtomicBool,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟 Redis 不可达
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    /// 让 key 立即过期
    pub fn expire_now(&self, key: &str) {
        if let Some(entry) = self.entries.lock().unwrap().get_mut(key) {
            entry.1 = Some(Instant::now());
        }
    }

    fn check(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::storage_unavailable("redis connection refused"));
        }
        Ok(())
    }

    fn live_value(entries: &mut HashMap<String, (String, Option<Instant>)>, key: &str) -> Option<String> {
        match entries.get(key) {
            Some((_, Some(deadline))) if Instant::now() >= *deadline => {
                entries.remove(key);
                None
            }
            Some((value, _)) => Some(value.clone()),
            None => None,
        }
    }
}

#[async_trait]
impl CachePort for InMemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live_value(&mut entries, key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        self.check()?;
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live_value(&mut entries, key).is_some())
    }

    async fn take(&self, key: &str) -> AppResult<Option<String>> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        let value = Self::live_value(&mut entries, key);
        entries.remove(key);
        Ok(value)
    }
}

// ============ Refresh Token ============

#[derive(Default)]
struct Table {
    rows: Vec<RefreshTokenRecord>,
    next_id: i64,
}

impl Table {
    fn find(&self, provider: &str, user_id: &str) -> Option<RefreshTokenRecord> {
        self.rows
            .iter()
            .filter(|r| r.provider == provider && r.user_id == user_id)
            .max_by_key(|r| (r.created_at, r.id))
            .cloned()
    }

    fn delete_where(&mut self, pred: impl Fn(&RefreshTokenRecord) -> bool) -> u64 {
        let before = self.rows.len();
        self.rows.retain(|r| !pred(r));
        (before - self.rows.len()) as u64
    }

    fn delete_through(&mut self, record: &RefreshTokenRecord) -> u64 {
        self.delete_where(|r| {
            r.provider == record.provider
                && r.user_id == record.user_id
                && (r.created_at, r.id) <= (record.created_at, record.id)
        })
    }

    fn insert(&mut self, token: &NewRefreshToken) -> RefreshTokenRecord {
        self.next_id += 1;
        let record = token.clone().into_record(self.next_id, Utc::now());
        self.rows.push(record.clone());
        record
    }
}

#[derive(Default)]
struct Faults {
    unavailable: AtomicBool,
    fail_saves: AtomicBool,
}

impl Faults {
    fn check(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::storage_unavailable("database connection refused"));
        }
        Ok(())
    }

    fn check_save(&self) -> AppResult<()> {
        self.check()?;
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::database("insert failed"));
        }
        Ok(())
    }
}

/// 内存版 Refresh Token 表，同时充当 Unit of Work 工厂
///
/// 事务在表的副本上执行，提交时整体写回。
#[derive(Clone, Default)]
pub struct InMemoryRefreshTokens {
    table: Arc<Mutex<Table>>,
    faults: Arc<Faults>,
}

impl InMemoryRefreshTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 之后的插入全部失败
    pub fn fail_saves(&self, fail: bool) {
        self.faults.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<RefreshTokenRecord> {
        self.table.lock().unwrap().rows.clone()
    }

    pub fn count_for(&self, provider: &str, user_id: &str) -> usize {
        self.rows()
            .iter()
            .filter(|r| r.provider == provider && r.user_id == user_id)
            .count()
    }

    /// 直接插入一条记录，绕过服务层
    pub fn insert_raw(&self, provider: &str, user_id: &str, token: &str, expires_at: DateTime<Utc>) {
        self.table
            .lock()
            .unwrap()
            .insert(&NewRefreshToken::new(provider, user_id, token, expires_at));
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokens {
    async fn find_by_provider_and_user(
        &self,
        provider: &str,
        user_id: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        self.faults.check()?;
        Ok(self.table.lock().unwrap().find(provider, user_id))
    }

    async fn delete_by_provider_and_user(&self, provider: &str, user_id: &str) -> AppResult<u64> {
        self.faults.check()?;
        Ok(self
            .table
            .lock()
            .unwrap()
            .delete_where(|r| r.provider == provider && r.user_id == user_id))
    }

    async fn save(&self, token: &NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        self.faults.check_save()?;
        Ok(self.table.lock().unwrap().insert(token))
    }

    async fn delete_through(&self, record: &RefreshTokenRecord) -> AppResult<u64> {
        self.faults.check()?;
        Ok(self.table.lock().unwrap().delete_through(record))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<u64> {
        self.faults.check()?;
        Ok(self.table.lock().unwrap().delete_where(|r| r.id == id))
    }

    async fn delete_expired_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        self.faults.check()?;
        Ok(self
            .table
            .lock()
            .unwrap()
            .delete_where(|r| r.expires_at <= before))
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryRefreshTokens {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        self.faults.check()?;
        let snapshot = {
            let table = self.table.lock().unwrap();
            Table {
                rows: table.rows.clone(),
                next_id: table.next_id,
            }
        };
        Ok(Box::new(InMemoryUnitOfWork {
            target: self.table.clone(),
            staged: StagedRefreshTokens {
                table: Mutex::new(snapshot),
                faults: self.faults.clone(),
            },
        }))
    }
}

struct StagedRefreshTokens {
    table: Mutex<Table>,
    faults: Arc<Faults>,
}

#[async_trait]
impl RefreshTokenRepository for StagedRefreshTokens {
    async fn find_by_provider_and_user(
        &self,
        provider: &str,
        user_id: &str,
    ) -> AppResult<Option<RefreshTokenRecord>> {
        self.faults.check()?;
        Ok(self.table.lock().unwrap().find(provider, user_id))
    }

    async fn delete_by_provider_and_user(&self, provider: &str, user_id: &str) -> AppResult<u64> {
        self.faults.check()?;
        Ok(self
            .table
            .lock()
            .unwrap()
            .delete_where(|r| r.provider == provider && r.user_id == user_id))
    }

    async fn save(&self, token: &NewRefreshToken) -> AppResult<RefreshTokenRecord> {
        self.faults.check_save()?;
        Ok(self.table.lock().unwrap().insert(token))
    }

    async fn delete_through(&self, record: &RefreshTokenRecord) -> AppResult<u64> {
        self.faults.check()?;
        Ok(self.table.lock().unwrap().delete_through(record))
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<u64> {
        self.faults.check()?;
        Ok(self.table.lock().unwrap().delete_where(|r| r.id == id))
    }

    async fn delete_expired_before(&self, before: DateTime<Utc>) -> AppResult<u64> {
        self.faults.check()?;
        Ok(self
            .table
            .lock()
            .unwrap()
            .delete_where(|r| r.expires_at <= before))
    }
}

struct InMemoryUnitOfWork {
    target: Arc<Mutex<Table>>,
    staged: StagedRefreshTokens,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn refresh_tokens(&self) -> &dyn RefreshTokenRepository {
        &self.staged
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.staged.faults.check()?;
        let staged = self.staged.table.into_inner().unwrap();
        *self.target.lock().unwrap() = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

// ============ Service ============

pub struct Harness {
    pub cache: Arc<InMemoryCache>,
    pub refresh_tokens: InMemoryRefreshTokens,
    pub service: Arc<TokenService>,
}

pub fn harness() -> Harness {
    let cache = Arc::new(InMemoryCache::new());
    let refresh_tokens = InMemoryRefreshTokens::new();
    let service = Arc::new(TokenService::new(
        cache.clone(),
        Arc::new(refresh_tokens.clone()),
        Arc::new(refresh_tokens.clone()),
    ));
    Harness {
        cache,
        refresh_tokens,
        service,
    }
}
