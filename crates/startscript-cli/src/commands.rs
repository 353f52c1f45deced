//! 子命令实现：读取成员配置，调用核心渲染，把结果交给 stdout 或文件。

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use anyhow::Context;
use startscript_core::{ClusterMemberConfig, render_tikv_start_script, resolve};
use tracing::info;

/// 读取配置并渲染脚本文本。
pub fn render_script(config_path: &Path) -> anyhow::Result<String> {
    let config = load(config_path)?;
    let script = render_tikv_start_script(&config)
        .with_context(|| format!("failed to render start script for `{}`", config.name()))?;
    info!(
        cluster = config.name(),
        namespace = config.namespace(),
        bytes = script.len(),
        "rendered start script"
    );
    Ok(script)
}

/// 读取配置并以 JSON 输出解析结果。
pub fn resolve_json(config_path: &Path) -> anyhow::Result<String> {
    let config = load(config_path)?;
    let resolved = resolve(&config);
    serde_json::to_string_pretty(&resolved).context("failed to serialize resolved addressing")
}

/// 写到指定文件；未指定时写 stdout。
pub fn emit(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("failed to write `{}`", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|()| stdout.flush())
                .context("failed to write to stdout")?;
        }
    }
    Ok(())
}

fn load(config_path: &Path) -> anyhow::Result<ClusterMemberConfig> {
    ClusterMemberConfig::from_path(config_path)
        .with_context(|| format!("failed to load member config `{}`", config_path.display()))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &TempDir, file_name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(file_name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn renders_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "render.toml",
            r#"
            name = "basic"
            namespace = "tidb"
            across_k8s = true
            "#,
        );
        let script = render_script(&path).unwrap();
        assert!(script.contains("discovery_url=basic-discovery.tidb:10261"));
    }

    #[test]
    fn resolve_outputs_tagged_pd_endpoint() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "resolve.toml",
            r#"
            name = "basic"
            namespace = "tidb"
            local_pd = false

            [reference_cluster]
            name = "base"
            "#,
        );
        let json: serde_json::Value = serde_json::from_str(&resolve_json(&path).unwrap()).unwrap();
        assert_eq!(json["pd_endpoint"]["kind"], "reference_cluster");
        assert_eq!(json["pd_endpoint"]["addr"], "base-pd:2379");
        assert_eq!(json["addr"], "0.0.0.0:20160");
    }

    #[test]
    fn invalid_config_reports_context() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "invalid.toml",
            r#"
            name = ""
            namespace = "tidb"
            "#,
        );
        let err = render_script(&path).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("failed to load member config"));
        assert!(chain.contains("invalid member config field `name`"));
    }

    #[test]
    fn emit_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emit.sh");
        emit("#!/bin/sh\n", Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "#!/bin/sh\n");
    }
}
