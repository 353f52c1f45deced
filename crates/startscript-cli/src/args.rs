use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 从成员配置渲染 TiKV 容器启动脚本
#[derive(Parser, Debug)]
#[command(name = "startscript")]
#[command(version)]
#[command(about = "Render the TiKV container start script for a cluster member", long_about = None)]
pub struct Cli {
    /// 日志过滤指令（如 `debug`、`startscript_core=trace`），缺省读取 RUST_LOG，再缺省为 info
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 渲染启动脚本
    Render {
        /// 成员配置文件（TOML）
        #[arg(short = 'c', long = "config")]
        config: PathBuf,

        /// 写入的目标文件，缺省输出到 stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// 以 JSON 输出解析后的地址值集合
    Resolve {
        /// 成员配置文件（TOML）
        #[arg(short = 'c', long = "config")]
        config: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_render_with_output() {
        let cli = Cli::try_parse_from([
            "startscript",
            "render",
            "--config",
            "member.toml",
            "-o",
            "start.sh",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Render { config, output } => {
                assert_eq!(config, PathBuf::from("member.toml"));
                assert_eq!(output, Some(PathBuf::from("start.sh")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn resolve_requires_config() {
        assert!(Cli::try_parse_from(["startscript", "resolve"]).is_err());
    }
}
