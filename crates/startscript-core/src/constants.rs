//! 启动脚本中使用的固定端口、路径与运行期占位符。
//!
//! 这些值由 TiKV 镜像与编排层共同约定，渲染过程只读取、不修改。

/// PD 对客户端开放的端口。
pub const PD_CLIENT_PORT: u16 = 2379;

/// TiKV 服务端口（Raft/gRPC）。
pub const TIKV_SERVER_PORT: u16 = 20160;

/// TiKV status 端口（HTTP 状态与指标）。
pub const TIKV_STATUS_PORT: u16 = 20180;

/// 跨集群 discovery 服务监听端口。
pub const DISCOVERY_PORT: u16 = 10261;

/// TiKV 数据卷在容器内的挂载点。
pub const TIKV_DATA_VOLUME_MOUNT_PATH: &str = "/var/lib/tikv";

/// TiKV 配置文件在容器内的固定位置。
pub const TIKV_CONFIG_PATH: &str = "/etc/tikv/tikv.toml";

/// TiKV 二进制路径。
pub const TIKV_BINARY: &str = "/tikv-server";

/// 启动脚本默认等待时长（秒），与 PD 启动超时的缺省值保持一致。
pub const DEFAULT_START_TIMEOUT_SECS: u32 = 30;

/// 容量占位符，由容器入口环境在运行期展开。
pub const CAPACITY_PLACEHOLDER: &str = "${CAPACITY}";

/// 跨集群场景下 PD 地址的延迟占位符，由 discovery 子脚本在容器启动时写入 `result`。
pub const DISCOVERED_PD_PLACEHOLDER: &str = "${result}";

/// 脚本内代表 Pod 身份的 shell 变量。
pub const POD_NAME_VAR: &str = "TIKV_POD_NAME";

/// IPv4 全网卡监听地址。
pub const IPV4_WILDCARD_HOST: &str = "0.0.0.0";

/// IPv6 全网卡监听地址（带方括号，便于直接拼接端口）。
pub const IPV6_WILDCARD_HOST: &str = "[::]";
