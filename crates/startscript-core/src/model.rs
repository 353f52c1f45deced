//! 集群成员的声明式描述。
//!
//! # 教案式说明
//! - **意图（Why）**：编排层在调用渲染入口前已经完成名称、命名空间、特性开关等高层决策，本模块用强类型
//!   承载这些结论，使 Topology Resolver 不必再面对“半解析”的字符串字典；
//! - **结构（How）**：[`ClusterMemberConfig`] 以私有字段 + `with_*` 构造器暴露，支持 `serde` 反序列化，
//!   [`FeatureFlags`] 是按首次出现顺序去重的令牌集合；
//! - **契约（What）**：模型一经构造即视为只读输入，渲染函数只借用它；
//! - **权衡（Trade-offs）**：异构集群通过 `reference_cluster` 是否存在来表达，而非额外布尔开关，
//!   这样“异构但没有引用集群”的矛盾组合在类型层面无法出现。

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_START_TIMEOUT_SECS, IPV4_WILDCARD_HOST, IPV6_WILDCARD_HOST};

/// 监听地址族偏好。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    /// 监听 `0.0.0.0`。
    #[default]
    Ipv4,
    /// 监听 `[::]`。
    Ipv6,
}

impl AddressFamily {
    /// 返回该地址族对应的全网卡监听主机名，IPv6 形式已带方括号。
    pub fn wildcard_host(self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => IPV4_WILDCARD_HOST,
            AddressFamily::Ipv6 => IPV6_WILDCARD_HOST,
        }
    }
}

/// 异构集群所引用的“主”集群身份。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCluster {
    /// 被引用集群的名称，PD 地址由它推导。
    pub name: String,
}

impl ReferenceCluster {
    /// 以集群名构造引用。
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// 按首次出现顺序去重的特性开关令牌集合。
///
/// # 教案式说明
/// - **Why**：令牌对本 crate 是不透明字符串，未知令牌应被保留而非拒绝，便于编排层提前下发新开关；
/// - **How**：内部用 `Vec<String>` 保存，插入时线性查重；集合通常只有个位数元素，线性扫描足够；
/// - **What**：`serde` 以字符串数组读写，反序列化时同样去重。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureFlags {
    tokens: Vec<String>,
}

impl FeatureFlags {
    /// 启动前等待广播域名解析到本 Pod IP 的令牌。
    pub const WAIT_FOR_DNS_NAME_IP_MATCH: &'static str = "WaitForDnsNameIpMatch";

    /// 空集合。
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入令牌；已存在时返回 `false` 且保持原有顺序。
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if self.contains(&token) {
            return false;
        }
        self.tokens.push(token);
        true
    }

    /// 是否包含给定令牌（大小写敏感）。
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|existing| existing == token)
    }

    /// 是否启用了 DNS 名称与 Pod IP 匹配等待。
    pub fn wait_for_dns_name_ip_match(&self) -> bool {
        self.contains(Self::WAIT_FOR_DNS_NAME_IP_MATCH)
    }

    /// 按插入顺序遍历令牌。
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl From<Vec<String>> for FeatureFlags {
    fn from(value: Vec<String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<FeatureFlags> for Vec<String> {
    fn from(value: FeatureFlags) -> Self {
        value.tokens
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureFlags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut flags = FeatureFlags::new();
        for token in iter {
            flags.insert(token);
        }
        flags
    }
}

/// 单个 TiKV 成员的渲染输入。
///
/// # 教案式说明
/// - **意图（Why）**：集中承载一次渲染所需的全部高层决策，调用方负责保证名称、命名空间等身份字段非空；
/// - **契约（What）**：
///   - `reference_cluster` 存在即表示异构集群；是否复用其 PD 还取决于 `local_pd`；
///   - `cluster_domain` 为空串与缺省等价；
///   - `start_timeout` 以秒计，缺省为 [`DEFAULT_START_TIMEOUT_SECS`]；
/// - **执行（How）**：通过 [`ClusterMemberConfig::new`] 加 `with_*` 链式构造，或经由
///   [`ClusterMemberConfig::from_toml_str`] 从 TOML 读取。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMemberConfig {
    name: String,
    namespace: String,
    #[serde(default)]
    data_sub_dir: String,
    #[serde(default)]
    address_family: AddressFamily,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cluster_domain: Option<String>,
    #[serde(default)]
    across_k8s: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference_cluster: Option<ReferenceCluster>,
    #[serde(default = "default_true")]
    local_pd: bool,
    #[serde(default)]
    enable_dynamic_configuration: bool,
    #[serde(default)]
    feature_flags: FeatureFlags,
    #[serde(default = "default_start_timeout")]
    start_timeout: u32,
}

fn default_true() -> bool {
    true
}

fn default_start_timeout() -> u32 {
    DEFAULT_START_TIMEOUT_SECS
}

impl ClusterMemberConfig {
    /// 以集群名与命名空间构造，其余字段取缺省值：IPv4、本地 PD、无特性开关。
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            data_sub_dir: String::new(),
            address_family: AddressFamily::default(),
            cluster_domain: None,
            across_k8s: false,
            reference_cluster: None,
            local_pd: true,
            enable_dynamic_configuration: false,
            feature_flags: FeatureFlags::new(),
            start_timeout: DEFAULT_START_TIMEOUT_SECS,
        }
    }

    pub fn with_data_sub_dir(mut self, sub_dir: impl Into<String>) -> Self {
        self.data_sub_dir = sub_dir.into();
        self
    }

    pub fn with_address_family(mut self, family: AddressFamily) -> Self {
        self.address_family = family;
        self
    }

    pub fn with_cluster_domain(mut self, domain: impl Into<String>) -> Self {
        self.cluster_domain = Some(domain.into());
        self
    }

    pub fn with_across_k8s(mut self, across_k8s: bool) -> Self {
        self.across_k8s = across_k8s;
        self
    }

    pub fn with_reference_cluster(mut self, name: impl Into<String>) -> Self {
        self.reference_cluster = Some(ReferenceCluster::new(name));
        self
    }

    pub fn with_local_pd(mut self, local_pd: bool) -> Self {
        self.local_pd = local_pd;
        self
    }

    pub fn with_dynamic_configuration(mut self, enabled: bool) -> Self {
        self.enable_dynamic_configuration = enabled;
        self
    }

    pub fn with_feature_flag(mut self, token: impl Into<String>) -> Self {
        self.feature_flags.insert(token);
        self
    }

    pub fn with_start_timeout(mut self, seconds: u32) -> Self {
        self.start_timeout = seconds;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn data_sub_dir(&self) -> &str {
        &self.data_sub_dir
    }

    pub fn address_family(&self) -> AddressFamily {
        self.address_family
    }

    /// 集群域名后缀；空串视为未配置。
    pub fn cluster_domain(&self) -> Option<&str> {
        self.cluster_domain
            .as_deref()
            .filter(|domain| !domain.is_empty())
    }

    /// 是否属于跨多个 Kubernetes 集群的逻辑集群。
    pub fn across_k8s(&self) -> bool {
        self.across_k8s
    }

    pub fn reference_cluster(&self) -> Option<&ReferenceCluster> {
        self.reference_cluster.as_ref()
    }

    /// 是否为依赖引用集群的异构集群。
    pub fn heterogeneous(&self) -> bool {
        self.reference_cluster.is_some()
    }

    /// 本集群是否未部署自己的 PD。
    pub fn without_local_pd(&self) -> bool {
        !self.local_pd
    }

    pub fn dynamic_configuration_enabled(&self) -> bool {
        self.enable_dynamic_configuration
    }

    pub fn feature_flags(&self) -> &FeatureFlags {
        &self.feature_flags
    }

    pub fn start_timeout(&self) -> u32 {
        self.start_timeout
    }
}
