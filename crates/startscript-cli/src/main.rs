//! `startscript`：把成员配置文件渲染为 TiKV 容器启动脚本。
//!
//! ```text
//! startscript render --config member.toml [--output start.sh]
//! startscript resolve --config member.toml
//! ```

mod args;
mod commands;
mod logging;

use clap::Parser;

use crate::args::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref())?;

    match cli.command {
        Command::Render { config, output } => {
            let script = commands::render_script(&config)?;
            commands::emit(&script, output.as_deref())
        }
        Command::Resolve { config } => {
            let json = commands::resolve_json(&config)?;
            commands::emit(&format!("{json}\n"), None)
        }
    }
}
