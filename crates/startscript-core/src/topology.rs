//! Topology Resolver：从成员模型推导脚本所需的全部地址与路径。
//!
//! # 教案式说明
//! - **意图（Why）**：把“地址怎么拼”与“脚本怎么排”拆开，编排器只消费已经确定的值；
//! - **逻辑（How）**：PD 端点按固定优先级三选一（跨集群 → 异构且无本地 PD → 本集群），其余字段是纯字符串拼接；
//! - **契约（What）**：[`resolve`] 对良构输入是全函数，不返回错误；身份字段缺失属于调用方的责任，
//!   需要时先调用 [`ClusterMemberConfig::validate`]。

use base64::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::constants::{
    CAPACITY_PLACEHOLDER, DISCOVERED_PD_PLACEHOLDER, DISCOVERY_PORT, PD_CLIENT_PORT, POD_NAME_VAR,
    TIKV_DATA_VOLUME_MOUNT_PATH, TIKV_SERVER_PORT, TIKV_STATUS_PORT,
};
use crate::model::ClusterMemberConfig;

/// 写入 `--pd` 参数的 PD 端点来源，三者互斥。
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PdEndpoint {
    /// 跨集群成员：真实地址要等容器启动后向 discovery 服务确认，脚本中写入延迟占位符。
    AcrossK8s {
        /// 本集群 PD 地址，仅以 base64 形式出现在 discovery 请求路径中。
        pd_url: String,
        /// discovery 服务地址（`host:port`）。
        discovery_addr: String,
    },
    /// 异构集群且本地没有 PD：借用引用集群的 PD。
    ReferenceCluster { addr: String },
    /// 默认情况：本集群自己的 PD。
    Local { addr: String },
}

impl PdEndpoint {
    /// 写进 `--pd=` 的值。
    pub fn flag_value(&self) -> &str {
        match self {
            PdEndpoint::AcrossK8s { .. } => DISCOVERED_PD_PLACEHOLDER,
            PdEndpoint::ReferenceCluster { addr } | PdEndpoint::Local { addr } => addr,
        }
    }

    /// 是否需要在脚本中插入 discovery 轮询子脚本。
    pub fn requires_discovery(&self) -> bool {
        matches!(self, PdEndpoint::AcrossK8s { .. })
    }

    fn branch(&self) -> &'static str {
        match self {
            PdEndpoint::AcrossK8s { .. } => "across_k8s",
            PdEndpoint::ReferenceCluster { .. } => "reference_cluster",
            PdEndpoint::Local { .. } => "local",
        }
    }
}

/// 一次渲染派生出的地址值集合。
///
/// 每次调用 [`resolve`] 生成一份新的实例，用后即弃。
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedAddressing {
    pub pd_endpoint: PdEndpoint,
    /// 服务监听地址。
    pub addr: String,
    /// status 监听地址。
    pub status_addr: String,
    /// 对外广播的主机名，包含运行期展开的 Pod 名变量。
    pub advertise_host: String,
    pub advertise_addr: String,
    pub data_dir: String,
    /// 容量占位符，由入口环境展开。
    pub capacity: String,
    /// 追加在基础参数之后的额外参数，以单个空格分隔；为空表示没有额外参数。
    pub extra_args: String,
    /// DNS 等待阈值（秒）。
    pub start_timeout: u32,
}

/// 根据成员模型推导地址值集合。
///
/// # 教案式说明
/// - **PD 端点（How）**：
///   1. `across_k8s` 优先：脚本里写 `${result}`，同时保留本集群 PD 与 discovery 地址供子脚本使用；
///   2. 其次是“异构且无本地 PD”：直接使用引用集群的 `<name>-pd:2379`；
///   3. 兜底为本集群的 `<name>-pd:2379`；
/// - **监听地址**：按地址族选择 `0.0.0.0` 或 `[::]`，端口固定；
/// - **广播地址**：`${TIKV_POD_NAME}.<name>-tikv-peer.<ns>.svc`，配置了集群域名时再追加后缀；
/// - **额外参数**：仅在启用动态配置时追加 `--advertise-status-addr`。
pub fn resolve(config: &ClusterMemberConfig) -> ResolvedAddressing {
    let pd_endpoint = resolve_pd_endpoint(config);
    debug!(
        cluster = config.name(),
        namespace = config.namespace(),
        branch = pd_endpoint.branch(),
        pd = pd_endpoint.flag_value(),
        "resolved pd endpoint"
    );

    let listen_host = config.address_family().wildcard_host();
    let advertise_host = advertise_host(config);

    let mut extra_args = Vec::new();
    if config.dynamic_configuration_enabled() {
        extra_args.push(format!(
            "--advertise-status-addr={}:{}",
            advertise_host, TIKV_STATUS_PORT
        ));
    }

    ResolvedAddressing {
        pd_endpoint,
        addr: format!("{listen_host}:{TIKV_SERVER_PORT}"),
        status_addr: format!("{listen_host}:{TIKV_STATUS_PORT}"),
        advertise_addr: format!("{advertise_host}:{TIKV_SERVER_PORT}"),
        advertise_host,
        data_dir: join_mount_path(TIKV_DATA_VOLUME_MOUNT_PATH, config.data_sub_dir()),
        capacity: CAPACITY_PLACEHOLDER.to_owned(),
        extra_args: extra_args.join(" "),
        start_timeout: config.start_timeout(),
    }
}

fn resolve_pd_endpoint(config: &ClusterMemberConfig) -> PdEndpoint {
    if config.across_k8s() {
        return PdEndpoint::AcrossK8s {
            pd_url: pd_member_addr(config.name()),
            discovery_addr: format!(
                "{}-discovery.{}:{}",
                config.name(),
                config.namespace(),
                DISCOVERY_PORT
            ),
        };
    }
    if config.heterogeneous()
        && config.without_local_pd()
        && let Some(reference) = config.reference_cluster()
    {
        return PdEndpoint::ReferenceCluster {
            addr: pd_member_addr(&reference.name),
        };
    }
    PdEndpoint::Local {
        addr: pd_member_addr(config.name()),
    }
}

/// `<cluster>-pd:2379`
fn pd_member_addr(cluster: &str) -> String {
    format!("{cluster}-pd:{PD_CLIENT_PORT}")
}

fn advertise_host(config: &ClusterMemberConfig) -> String {
    let mut host = format!(
        "${{{POD_NAME_VAR}}}.{}-tikv-peer.{}.svc",
        config.name(),
        config.namespace()
    );
    if let Some(domain) = config.cluster_domain() {
        host.push('.');
        host.push_str(domain);
    }
    host
}

/// discovery 请求路径中使用的 PD 地址编码。
///
/// 与 `echo $pd_url | base64` 的结果逐字节一致：编码内容包含 `echo` 追加的换行符。
pub fn encode_pd_url(pd_url: &str) -> String {
    let mut raw = String::with_capacity(pd_url.len() + 1);
    raw.push_str(pd_url);
    raw.push('\n');
    BASE64_STANDARD.encode(raw)
}

/// 以词法方式拼接挂载点与子目录，语义同 POSIX 路径规整：
/// 丢弃空段与 `.`，`..` 回退一级但不会越过根目录。
fn join_mount_path(mount: &str, sub_dir: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in mount.split('/').chain(sub_dir.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}
