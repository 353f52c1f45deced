//! # startscript-core
//!
//! ## 定位与职责（Why）
//! - 根据 TiKV 成员的声明式描述（集群拓扑、地址族、特性开关、跨集群关系）生成容器启动脚本；
//! - IPv4/IPv6、单集群/跨集群 PD 发现、异构集群 PD 委托、DNS 就绪等待、动态配置参数这些变体彼此正交，
//!   本 crate 负责把它们组合成一份不自相矛盾的 shell 脚本。
//!
//! ## 架构嵌入（Where）
//! - `model`：渲染输入 [`ClusterMemberConfig`] 与特性开关集合 [`FeatureFlags`]；
//! - `config`：从 TOML 读取并校验成员配置；
//! - `topology`：Topology Resolver，推导 [`ResolvedAddressing`]；
//! - `fragment`：具名片段与 `{{ variable }}` 替换；
//! - `script`：Script Composer，按固定顺序拼接片段；
//! - `error`：[`TemplateError`] 与 [`ConfigError`]。
//!
//! ## 契约（What）
//! - 渲染是同步、无共享可变状态的纯计算，可在多线程中并发调用；
//! - 生成的脚本中的网络轮询只在容器内执行，本 crate 不做任何网络或文件 I/O（`config` 的文件读取除外）。
//!
//! ```
//! use startscript_core::{ClusterMemberConfig, render_tikv_start_script};
//!
//! let config = ClusterMemberConfig::new("basic", "tidb-cluster");
//! let script = render_tikv_start_script(&config).expect("static fragments are well formed");
//! assert!(script.contains("--pd=basic-pd:2379"));
//! assert!(script.ends_with("exec /tikv-server ${ARGS}\n"));
//! ```

/// 固定端口、路径与运行期占位符。
pub mod constants;
/// 成员配置的 TOML 加载与校验。
pub mod config;
/// 错误类型集中声明处。
pub mod error;
/// 片段与替换引擎。
pub mod fragment;
/// 渲染输入模型。
pub mod model;
/// Script Composer。
pub mod script;
/// Topology Resolver。
pub mod topology;

pub use crate::error::{ConfigError, TemplateError};
pub use crate::fragment::{Bindings, Fragment};
pub use crate::model::{AddressFamily, ClusterMemberConfig, FeatureFlags, ReferenceCluster};
pub use crate::script::compose;
pub use crate::topology::{PdEndpoint, ResolvedAddressing, resolve};

/// 渲染一个 TiKV 成员的启动脚本：先解析拓扑，再按成员的特性开关拼接片段。
///
/// 对良构的静态片段，此函数不会失败；返回 `Result` 只是为了让片段缺陷以错误而非 panic 的形式上报。
pub fn render_tikv_start_script(config: &ClusterMemberConfig) -> Result<String, TemplateError> {
    let resolved = resolve(config);
    compose(&resolved, config.feature_flags())
}
