/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::RunStats;

/// 初始化日志
///
/// 日志写到 stderr：子进程的 stdout 用来回传记录
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 目标页面: {}", config.target_url);
    info!(
        "📊 进程数: {} | 每进程标签页: {} | headless: {}",
        config.num_processes, config.tabs_per_process, config.headless
    );
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &RunStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("⏱️ 总耗时: {:.2} 秒", stats.total.as_secs_f64());
    info!("⏱️ 平均每进程: {:.2} 秒", stats.per_process.as_secs_f64());
    info!("⏱️ 平均每地区: {:.2} 秒", stats.per_item.as_secs_f64());
    info!("✅ 成功: {}/{}", stats.extracted, stats.attempted);
    info!("❌ 跳过: {}", stats.attempted.saturating_sub(stats.extracted));
    if stats.crashed_workers > 0 {
        info!("💥 崩溃进程: {}", stats.crashed_workers);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_text;

    #[test]
    fn truncates_by_chars_not_bytes() {
        assert_eq!(truncate_text("Москва", 3), "Мос...");
        assert_eq!(truncate_text("Тверь", 10), "Тверь");
    }
}
