/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则 `verbose` 时为 debug，默认 info。重复调用无副作用
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `output_dir`: 本次运行的输出目录
/// - `num_reviews`: 目标评审数量
pub fn log_startup(output_dir: &Path, num_reviews: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 论文评审生成");
    info!("📁 输出目录: {}", output_dir.display());
    info!("📊 目标评审数量: {}", num_reviews);
    info!("{}", "=".repeat(60));
}

/// 记录候选池信息
pub fn log_pool_built(total: usize, unreviewed: usize) {
    info!("✓ 共找到 {} 篇相关论文", total);
    info!("✓ 其中 {} 篇尚未评审", unreviewed);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `succeeded`: 成功数量
/// - `attempted`: 尝试数量
/// - `output_dir`: 输出目录
/// - `reviewed_total`: 累计已评审数量
pub fn print_final_stats(succeeded: usize, attempted: usize, output_dir: &Path, reviewed_total: usize) {
    let output_dir = output_dir
        .canonicalize()
        .unwrap_or_else(|_| output_dir.to_path_buf());
    info!("\n{}", "=".repeat(60));
    info!("📊 运行统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功生成 {}/{} 篇评审", succeeded, attempted);
    info!("📁 评审保存在: {}", output_dir.display());
    info!("📚 累计已评审论文: {}", reviewed_total);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// 取前 `max_chars` 个字符（按字符而不是字节）
pub fn take_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
