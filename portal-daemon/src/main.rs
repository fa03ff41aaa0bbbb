mod cli;
mod runner;

use clap::Parser;
use cli::{Cli, Command};
use portal_core::config::{load_config, PortalConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 初始化日志（这是入口点的职责）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // 2. 调用库的核心逻辑
    if let Err(e) = run(Cli::parse()).await {
        // 3. 处理顶层错误
        tracing::error!("❌ Portal failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path).await?,
        None => PortalConfig::default(),
    };

    match cli.command {
        Command::Serve => runner::run_server(&config).await,
        Command::Populate { url, escape } => runner::run_populate(&config, url, escape).await,
    }
}
