use std::time::Duration;

use reqwest::Client;

const USER_AGENT: &str = concat!("paper_review_bot/", env!("CARGO_PKG_VERSION"));

/// 创建带超时的 HTTP 客户端
///
/// 超时即视为该次调用失败，由调用方决定如何处理
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}
