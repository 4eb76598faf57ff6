//! labzang-adapter-redis - Redis 适配器

mod cache;
mod connection;
mod error;

pub use cache::*;
pub use connection::*;
pub use error::*;
