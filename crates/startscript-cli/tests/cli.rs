//! 以子进程方式驱动 `startscript` 二进制。

use std::{fs, path::PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// 把配置写进独立临时目录；`TempDir` 析构时连同目录一起删除。
fn fixture(body: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("member.toml");
    fs::write(&path, body).unwrap();
    (dir, path)
}

fn startscript() -> Command {
    Command::new(env!("CARGO_BIN_EXE_startscript"))
}

#[test]
fn render_prints_script_to_stdout_and_logs_to_stderr() {
    let (_dir, config) = fixture(
        r#"
        name = "basic"
        namespace = "tidb"
        address_family = "ipv6"
        feature_flags = ["WaitForDnsNameIpMatch"]
        "#,
    );

    startscript()
        .args(["--log-level", "info", "render", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#!/bin/sh\n"))
        .stdout(predicate::str::contains("--addr=[::]:20160 \\"))
        .stdout(predicate::str::contains(
            "componentDomain=${TIKV_POD_NAME}.basic-tikv-peer.tidb.svc",
        ))
        .stderr(predicate::str::contains("rendered start script"));
}

#[test]
fn render_writes_output_file() {
    let (dir, config) = fixture(
        r#"
        name = "basic"
        namespace = "tidb"
        "#,
    );
    let output = dir.path().join("start.sh");

    startscript()
        .args(["render", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let script = fs::read_to_string(&output).unwrap();
    assert!(script.ends_with("exec /tikv-server ${ARGS}\n"));
}

#[test]
fn resolve_prints_tagged_pd_endpoint() {
    let (_dir, config) = fixture(
        r#"
        name = "basic"
        namespace = "tidb"
        across_k8s = true
        "#,
    );

    startscript()
        .args(["resolve", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""kind": "across_k8s""#))
        .stdout(predicate::str::contains(
            r#""discovery_addr": "basic-discovery.tidb:10261""#,
        ));
}

#[test]
fn missing_config_fails_with_nonzero_exit() {
    startscript()
        .args(["render", "--config", "/nonexistent/startscript/member.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load member config"));
}
