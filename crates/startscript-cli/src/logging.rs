//! 进程级 tracing 订阅器安装。
//!
//! 脚本正文写 stdout，日志一律写 stderr，两者可以直接分别重定向。

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// 安装全局 fmt 订阅器。
///
/// 过滤指令优先级：`--log-level` > `RUST_LOG` > `info`。
pub fn init(directive: Option<&str>) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(directive)?)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

fn build_env_filter(directive: Option<&str>) -> anyhow::Result<EnvFilter> {
    match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|err| anyhow!("invalid log directive `{directive}`: {err}")),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}
