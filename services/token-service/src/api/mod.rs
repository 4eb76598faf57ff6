//! HTTP 接口（服务信息与健康检查）

mod routes;

pub use routes::*;
