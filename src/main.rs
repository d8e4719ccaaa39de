use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reopt_batch::utils::logging;
use reopt_batch::{App, Config};
use std::path::PathBuf;

/// 批量提交 REopt 场景并汇总结果
#[derive(Parser, Debug)]
#[command(name = "reopt_batch", version, about)]
struct Cli {
    /// TOML 配置文件
    #[arg(short, long, env = "REOPT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// 提交全部场景并生成报表（默认）
    Run,
    /// 用已保存的结果重新生成报表
    Render,
    /// 由输入定义生成输入模板
    Template,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref()).context("加载配置失败")?;

    // 初始化日志
    logging::init(&config.log_file)?;

    // 初始化并运行应用
    let app = App::initialize(config)?;
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => app.run().await,
        Command::Render => app.render().await,
        Command::Template => app.template().await,
    }
}
