//! labzang-token - 社交登录 Token 存储服务
//!
//! Access Token / OAuth 原始 Token / Authorization Code 存 Redis（TTL 由 Redis 负责），
//! Refresh Token 存 PostgreSQL（读取时校验过期）。

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
