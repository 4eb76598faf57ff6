//! PostgreSQL 持久化

mod migrations;
mod postgres_refresh_token_repository;
mod postgres_unit_of_work;
mod refresh_token_sql;
mod tx_refresh_token_repository;

pub use migrations::*;
pub use postgres_refresh_token_repository::*;
pub use postgres_unit_of_work::*;
pub use tx_refresh_token_repository::*;
