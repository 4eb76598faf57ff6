//! 应用层

mod token_service;

pub use token_service::*;
