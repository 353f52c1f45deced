//! 成员配置的 TOML 加载与校验。
//!
//! 解析器对良构输入是全函数，这里是唯一拒绝缺失身份字段的地方。文件形态示例：
//!
//! ```toml
//! name = "basic"
//! namespace = "tidb-cluster"
//! data_sub_dir = "data"
//! address_family = "ipv6"
//! cluster_domain = "cluster.local"
//! across_k8s = false
//! local_pd = false
//! enable_dynamic_configuration = true
//! feature_flags = ["WaitForDnsNameIpMatch"]
//! start_timeout = 60
//!
//! [reference_cluster]
//! name = "base"
//! ```

use std::{fs, path::Path};

use tracing::debug;

use crate::error::ConfigError;
use crate::model::ClusterMemberConfig;

impl ClusterMemberConfig {
    /// 解析 TOML 文本并立即校验。
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ClusterMemberConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 读取并解析配置文件。
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        debug!(path = %path.display(), cluster = config.name(), "loaded member config");
        Ok(config)
    }

    /// 检查渲染所需的身份字段。
    ///
    /// - **Why**：这些值会原样写进双引号包裹的 shell 参数，必须排除引号、`$`、空白等会改变脚本语义的字符；
    /// - **What**：集群名、命名空间、引用集群名非空且只含 DNS 名称字符；集群域名同理（可为空）；
    ///   数据子目录额外允许 `/` 与 `_`；超时必须为正；
    /// - **Trade-offs**：只做字符集检查，不校验 DNS label 长度，名称规则由上游 CRD 校验负责。
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_dns_name("name", self.name())?;
        require_dns_name("namespace", self.namespace())?;
        if let Some(reference) = self.reference_cluster() {
            require_dns_name("reference_cluster.name", &reference.name)?;
        }
        if let Some(domain) = self.cluster_domain()
            && !domain.chars().all(is_dns_char)
        {
            return Err(ConfigError::Invalid {
                field: "cluster_domain",
                reason: "may only contain alphanumerics, '-' and '.'",
            });
        }
        if !self
            .data_sub_dir()
            .chars()
            .all(|c| is_dns_char(c) || c == '/' || c == '_')
        {
            return Err(ConfigError::Invalid {
                field: "data_sub_dir",
                reason: "may only contain alphanumerics, '-', '_', '.' and '/'",
            });
        }
        if self.start_timeout() == 0 {
            return Err(ConfigError::Invalid {
                field: "start_timeout",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

fn is_dns_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '.'
}

fn require_dns_name(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid {
            field,
            reason: "must not be empty",
        });
    }
    if !value.chars().all(is_dns_char) {
        return Err(ConfigError::Invalid {
            field,
            reason: "may only contain alphanumerics, '-' and '.'",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::model::{AddressFamily, FeatureFlags};

    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = ClusterMemberConfig::from_toml_str(
            r#"
            name = "basic"
            namespace = "tidb"
            "#,
        )
        .expect("minimal config parses");

        assert_eq!(config, ClusterMemberConfig::new("basic", "tidb"));
        assert_eq!(config.start_timeout(), 30);
        assert!(!config.without_local_pd());
    }

    #[test]
    fn full_config_reads_every_field() {
        let config = ClusterMemberConfig::from_toml_str(
            r#"
            name = "basic"
            namespace = "tidb"
            data_sub_dir = "data"
            address_family = "ipv6"
            cluster_domain = "cluster.local"
            across_k8s = true
            local_pd = false
            enable_dynamic_configuration = true
            feature_flags = ["WaitForDnsNameIpMatch", "Other", "WaitForDnsNameIpMatch"]
            start_timeout = 60

            [reference_cluster]
            name = "base"
            "#,
        )
        .expect("full config parses");

        assert_eq!(config.data_sub_dir(), "data");
        assert_eq!(config.address_family(), AddressFamily::Ipv6);
        assert_eq!(config.cluster_domain(), Some("cluster.local"));
        assert!(config.across_k8s());
        assert_eq!(config.reference_cluster().map(|r| r.name.as_str()), Some("base"));
        assert!(config.without_local_pd());
        assert!(config.dynamic_configuration_enabled());
        assert_eq!(
            config.feature_flags(),
            &["WaitForDnsNameIpMatch", "Other"]
                .into_iter()
                .collect::<FeatureFlags>()
        );
        assert_eq!(config.start_timeout(), 60);
    }

    #[test]
    fn missing_namespace_is_a_parse_error() {
        let err = ClusterMemberConfig::from_toml_str(r#"name = "basic""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn blank_identity_fields_are_rejected() {
        let err = ClusterMemberConfig::from_toml_str(
            r#"
            name = "  "
            namespace = "tidb"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "name", .. }));

        let err = ClusterMemberConfig::new("basic", "tidb")
            .with_reference_cluster("")
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "reference_cluster.name",
                ..
            }
        ));
    }

    #[test]
    fn shell_metacharacters_are_rejected() {
        let err = ClusterMemberConfig::new("demo\"; rm -rf /", "tidb")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "name", .. }));

        let err = ClusterMemberConfig::new("demo", "tidb")
            .with_cluster_domain("cluster.local$(id)")
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "cluster_domain",
                ..
            }
        ));

        let err = ClusterMemberConfig::new("demo", "tidb")
            .with_data_sub_dir("data dir")
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "data_sub_dir",
                ..
            }
        ));

        ClusterMemberConfig::new("demo", "tidb")
            .with_cluster_domain("cluster.local")
            .with_data_sub_dir("data/tikv_0")
            .validate()
            .expect("ordinary values pass");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ClusterMemberConfig::new("basic", "tidb")
            .with_start_timeout(0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "start_timeout",
                ..
            }
        ));
    }

    #[test]
    fn unreadable_path_reports_io_error() {
        let err = ClusterMemberConfig::from_path("/nonexistent/startscript/member.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
