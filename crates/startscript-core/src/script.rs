//! Script Composer：按固定顺序挑选并拼接脚本片段。
//!
//! # 教案式说明
//! - **意图（Why）**：地址、端口、特性开关之间互相独立，却要汇成一份互不矛盾的 shell 脚本；
//!   把每种变体做成独立片段、由 Rust 代码决定取舍，模板里不出现任何分支；
//! - **顺序（How）**：脚本头 → Pod 身份 → DNS 等待片段（二选一）→ 跨集群 discovery（可选）→ 公共片段 →
//!   参数组装（额外参数可选）→ 运行期标签判断 → 执行；
//! - **契约（What）**：成功时返回完整脚本；任一片段替换失败返回 [`TemplateError`]，不返回半成品；
//! - **权衡（Trade-offs）**：`STORE_LABELS` 只能在容器内读取，因此生成 shell 条件语句，
//!   渲染阶段绝不读取运行期环境变量。

use tracing::debug;

use crate::constants::{POD_NAME_VAR, TIKV_BINARY, TIKV_CONFIG_PATH};
use crate::error::TemplateError;
use crate::fragment::{Bindings, Fragment};
use crate::model::FeatureFlags;
use crate::topology::{PdEndpoint, ResolvedAddressing, encode_pd_url};

/// 启动脚本的全部静态片段。
pub mod fragments {
    use crate::fragment::Fragment;

    pub const HEADER: Fragment = Fragment::new(
        "header",
        r#"#!/bin/sh

# This script is used to start tikv containers in kubernetes cluster

set -uo pipefail
"#,
    );

    pub const POD_IDENTITY: Fragment = Fragment::new(
        "pod-identity",
        r#"
{{ PodNameVar }}=${POD_NAME:-$HOSTNAME}
"#,
    );

    /// 轮询 `getent ahosts` 直到广播域名解析到本机某个 IP，超过阈值后退出。
    pub const DNS_AWAIT_IP_MATCH: Fragment = Fragment::new(
        "dns-await-ip-match",
        r#"
componentDomain={{ AdvertiseHost }}
waitThreshold={{ StartTimeout }}
nsLookupCmd="getent ahosts $componentDomain | sed -n 's/ *STREAM.*//p'"

elapseTime=0
period=1
while true; do
    sleep ${period}
    elapseTime=$(( elapseTime+period ))

    if [[ ${elapseTime} -ge ${waitThreshold} ]]; then
        echo "waiting for cluster ready timeout" >&2
        exit 1
    fi

    digRes=$(eval "$nsLookupCmd")
    if [ $? -ne 0 ]; then
        echo "domain resolve ${componentDomain} failed"
        echo "$digRes"
        continue
    fi

    if [ -z "${digRes}" ]; then
        echo "domain resolve ${componentDomain} no record return"
        continue
    fi

    echo "domain resolve ${componentDomain} success"
    echo "$digRes"

    hostIps=" $(hostname -I) "
    echo "hostIps: ${hostIps}"

    foundIp=false
    for resolvedIp in ${digRes}; do
        case "${hostIps}" in
            *" ${resolvedIp} "*)
                foundIp=true
                break
                ;;
        esac
    done

    if [ "${foundIp}" = true ]; then
        echo "Success: resolved IP matches one of podIPs"
        break
    fi
    echo "Resolved IP does not match any of podIPs"
done
"#,
    );

    /// 不等待 DNS，保持与从未等待过的既有部署一致。
    pub const DNS_AWAIT_NONE: Fragment = Fragment::new("dns-await-none", "");

    /// 向 discovery 服务确认 PD 端点，成功后写入 `result`；失败则随机退避 0–4 秒无限重试。
    pub const ACROSS_K8S_DISCOVERY: Fragment = Fragment::new(
        "across-k8s-discovery",
        r#"
encoded_domain_url={{ EncodedPdUrl }}
discovery_url={{ DiscoveryAddr }}
until result=$(wget -qO- -T 3 http://${discovery_url}/verify/${encoded_domain_url} 2>/dev/null | sed 's/http:\/\///g'); do
    echo "waiting for the verification of PD endpoints ..."
    sleep $((RANDOM % 5))
done
"#,
    );

    /// 读取 downward API 注解；`runmode=debug` 时挂起容器以便排障。
    pub const COMMON: Fragment = Fragment::new(
        "common",
        r#"
ANNOTATIONS="/etc/podinfo/annotations"
if [[ -f "${ANNOTATIONS}" ]]; then
    source ${ANNOTATIONS} 2>/dev/null
fi

runmode=${runmode:-normal}
if [[ X${runmode} == Xdebug ]]; then
    echo "entering debug mode."
    tail -f /dev/null
fi
"#,
    );

    pub const ARGS: Fragment = Fragment::new(
        "args",
        r#"
ARGS="--pd={{ PdAddr }} \
--advertise-addr={{ AdvertiseAddr }} \
--addr={{ Addr }} \
--status-addr={{ StatusAddr }} \
--data-dir={{ DataDir }} \
--capacity={{ Capacity }} \
--config={{ ConfigPath }}"
"#,
    );

    pub const EXTRA_ARGS: Fragment = Fragment::new(
        "extra-args",
        r#"ARGS="${ARGS} {{ ExtraArgs }}"
"#,
    );

    pub const STORE_LABELS: Fragment = Fragment::new(
        "store-labels",
        r#"
if [ ! -z "${STORE_LABELS:-}" ]; then
  LABELS="--labels ${STORE_LABELS}"
  ARGS="${ARGS} ${LABELS}"
fi
"#,
    );

    pub const EXEC: Fragment = Fragment::new(
        "exec",
        r#"
echo "starting tikv-server ..."
echo "{{ Binary }} ${ARGS}"
exec {{ Binary }} ${ARGS}
"#,
    );

    /// 所有片段，按脚本中可能出现的顺序排列。
    pub const ALL: [Fragment; 10] = [
        HEADER,
        POD_IDENTITY,
        DNS_AWAIT_IP_MATCH,
        DNS_AWAIT_NONE,
        ACROSS_K8S_DISCOVERY,
        COMMON,
        ARGS,
        EXTRA_ARGS,
        STORE_LABELS,
        EXEC,
    ];
}

/// 选出本次渲染要拼接的片段序列。
///
/// DNS 等待片段恰好一个；discovery 片段当且仅当 PD 端点来自跨集群分支时出现；
/// 额外参数片段当且仅当 `extra_args` 非空时出现。
///
/// # 权衡（Trade-offs）
/// 公共片段（注解文件与 `runmode=debug` 挂起）排在 DNS 等待与 discovery 之后。
/// 因此 DNS 始终无法匹配的 Pod 会在进入 debug 挂起之前以 1 退出；
/// 若要在 DNS 等待期间也能挂起排障，需要把公共片段移到 Pod 身份之前，这会改变既有脚本的片段顺序。
pub fn plan(resolved: &ResolvedAddressing, feature_flags: &FeatureFlags) -> Vec<Fragment> {
    let dns_await = if feature_flags.wait_for_dns_name_ip_match() {
        fragments::DNS_AWAIT_IP_MATCH
    } else {
        fragments::DNS_AWAIT_NONE
    };

    let mut plan = vec![fragments::HEADER, fragments::POD_IDENTITY, dns_await];
    if resolved.pd_endpoint.requires_discovery() {
        plan.push(fragments::ACROSS_K8S_DISCOVERY);
    }
    plan.push(fragments::COMMON);
    plan.push(fragments::ARGS);
    if !resolved.extra_args.is_empty() {
        plan.push(fragments::EXTRA_ARGS);
    }
    plan.push(fragments::STORE_LABELS);
    plan.push(fragments::EXEC);
    plan
}

/// 把地址值集合与特性开关组合为最终脚本文本。
///
/// # 教案式说明
/// - **Why**：唯一的失败模式是片段与变量不匹配，这是编程缺陷；以 `Result` 返回而不是 panic，
///   让宿主进程可以记录错误后继续服务其他成员；
/// - **How**：先确定片段序列，再用同一份 [`Bindings`] 依次渲染，全部成功后才拼接；
/// - **What**：相同输入产出逐字节相同的输出，函数不读取任何外部状态。
pub fn compose(
    resolved: &ResolvedAddressing,
    feature_flags: &FeatureFlags,
) -> Result<String, TemplateError> {
    let plan = plan(resolved, feature_flags);
    debug!(
        fragments = ?plan.iter().map(Fragment::name).collect::<Vec<_>>(),
        "composing start script"
    );

    let bindings = bindings_for(resolved);
    let mut script = String::new();
    for fragment in &plan {
        script.push_str(&fragment.render(&bindings)?);
    }
    Ok(script)
}

fn bindings_for(resolved: &ResolvedAddressing) -> Bindings {
    let mut bindings = Bindings::new()
        .bind("PodNameVar", POD_NAME_VAR)
        .bind("AdvertiseHost", resolved.advertise_host.as_str())
        .bind("StartTimeout", resolved.start_timeout.to_string())
        .bind("PdAddr", resolved.pd_endpoint.flag_value())
        .bind("AdvertiseAddr", resolved.advertise_addr.as_str())
        .bind("Addr", resolved.addr.as_str())
        .bind("StatusAddr", resolved.status_addr.as_str())
        .bind("DataDir", resolved.data_dir.as_str())
        .bind("Capacity", resolved.capacity.as_str())
        .bind("ConfigPath", TIKV_CONFIG_PATH)
        .bind("ExtraArgs", resolved.extra_args.as_str())
        .bind("Binary", TIKV_BINARY);

    if let PdEndpoint::AcrossK8s {
        pd_url,
        discovery_addr,
    } = &resolved.pd_endpoint
    {
        bindings = bindings
            .bind("EncodedPdUrl", encode_pd_url(pd_url))
            .bind("DiscoveryAddr", discovery_addr.as_str());
    }
    bindings
}
