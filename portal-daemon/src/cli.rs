use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wi-Fi setup portal
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// TOML 配置文件路径，缺省时使用内置默认值
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the portal web server
    Serve,
    /// Fetch a portal's network list and print the rendered options
    Populate {
        /// Portal base URL, overrides `client.base_url`
        #[arg(long)]
        url: Option<String>,
        /// Escape markup characters in SSIDs
        #[arg(long)]
        escape: bool,
    },
}
