//! 基础设施层
//!
//! 持有稀缺资源（HTTP 连接池），只暴露能力

pub mod http;

pub use http::build_client;
