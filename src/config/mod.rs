//! 配置模块
//!
//! 启动时加载一次 `AppConfig`，之后按引用传入各个构造函数，不设全局实例。

mod structs;

pub use structs::*;
