//! labzang-bootstrap - 服务启动骨架
//!
//! 配置加载之后的运行时初始化、存储连接建立和关闭信号

mod infrastructure;
mod runtime;

pub use infrastructure::*;
pub use runtime::*;
