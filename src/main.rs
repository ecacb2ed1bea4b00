use anyhow::{Context, Result};
use paper_review_bot::clients::GeminiClient;
use paper_review_bot::utils::{logging, truncate_text};
use paper_review_bot::{App, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load(None).context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    match std::env::args().nth(1).as_deref() {
        Some("list-models") => list_models(&config).await,
        _ => {
            // 初始化并运行应用
            App::initialize(config).await?.run().await?;
            Ok(())
        }
    }
}

/// 列出当前凭据可用的生成模型
async fn list_models(config: &Config) -> Result<()> {
    let client = GeminiClient::new(config)?;
    let models = client.list_models().await.context("获取模型列表失败")?;

    info!("{}", "=".repeat(60));
    info!("📋 可用模型 ({} 个)", models.len());
    info!("{}", "=".repeat(60));
    for model in models.iter().filter(|m| m.supports_generate_content()) {
        info!("✓ {} ({})", model.name, model.display_name);
        if !model.description.is_empty() {
            info!("  描述: {}", truncate_text(&model.description, 100));
        }
        info!("  支持方法: {}", model.supported_generation_methods.join(", "));
        if let (Some(input), Some(output)) = (model.input_token_limit, model.output_token_limit) {
            info!("  Token 上限: 输入 {} / 输出 {}", input, output);
        }
    }
    info!("{}", "=".repeat(60));
    Ok(())
}
