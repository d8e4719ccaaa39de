//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use crate::config::Config;
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::sync::{Mutex, OnceLock};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志：控制台 + 日志文件
///
/// 默认级别为 info，可以用 `RUST_LOG` 覆盖。
/// 重复调用（例如在测试中）不会报错。
pub fn init(log_file_path: &str) -> Result<()> {
    init_log_file(log_file_path)?;

    let file = fs::OpenOptions::new()
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init();

    Ok(())
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nREopt 批量场景日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - REopt 批量场景模式");
    info!("🌐 API: {} ({})", config.api_root, config.resolved_api_version());
    info!("⏱️ 轮询间隔: {} 秒", config.poll_interval_secs);
    info!("{}", "=".repeat(60));
}

/// 记录场景加载信息
pub fn log_rows_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的场景", total);
    info!("📋 将按顺序逐个提交并等待结果\n");
}

/// 记录单个场景开始处理
pub fn log_row_start(row_number: usize, total: usize, description: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📦 开始处理第 {}/{} 个场景: {}", row_number, total, description);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 拿到结果的场景数量
/// - `failed`: 没有结果的场景数量
/// - `aborted`: 轮询中止（只有部分结果）的场景数量
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, aborted: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, success + failed + aborted);
    info!("⚠️ 轮询中止: {}", aborted);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
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

/// 隐藏 URL 中的 api_key，避免写进日志
pub fn redact_api_key(url: &str) -> String {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(api_key=)[^&]*").expect("api_key pattern is valid")
    });
    re.replace_all(url, "${1}***").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_by_chars() {
        assert_eq!(truncate_text("优化求解中", 2), "优化...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn redacts_key_in_query() {
        assert_eq!(
            redact_api_key("https://x/job/?api_key=SECRET"),
            "https://x/job/?api_key=***"
        );
        assert_eq!(
            redact_api_key("https://x/help?API_KEY=abc&format=json"),
            "https://x/help?API_KEY=***&format=json"
        );
        assert_eq!(redact_api_key("https://x/job/1/results"), "https://x/job/1/results");
    }

    #[test]
    fn log_file_gets_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.log");
        let path = path.to_str().expect("utf8 path");

        init_log_file(path).expect("write header");
        let content = fs::read_to_string(path).expect("read log");
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("REopt 批量场景日志"));
    }
}
