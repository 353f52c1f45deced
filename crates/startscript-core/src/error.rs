//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 渲染路径只有一种失败：片段文本与其替换变量不匹配，属于静态缺陷而非运行期条件；
//!   以 [`TemplateError`] 返回而非 panic，使调用方可以把错误原样上报；
//! - 配置加载属于调用方一侧的职责，单独以 [`ConfigError`] 表达，不与渲染错误混用。
//!
//! ## 设计要求（What）
//! - 所有错误类型派生 `thiserror::Error`，携带片段名或字段名帮助定位；
//! - 渲染失败时绝不返回半成品脚本。

use std::path::PathBuf;

use thiserror::Error;

/// 片段解析或变量替换失败。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TemplateError {
    /// `{{` 之后找不到匹配的 `}}`。
    #[error("fragment `{fragment}` has an unterminated placeholder at byte {offset}")]
    Unterminated {
        fragment: &'static str,
        offset: usize,
    },

    /// `{{ }}` 内没有变量名。
    #[error("fragment `{fragment}` has an empty placeholder at byte {offset}")]
    EmptyPlaceholder {
        fragment: &'static str,
        offset: usize,
    },

    /// 片段引用了本次渲染未绑定的变量。
    #[error("fragment `{fragment}` references unbound variable `{variable}`")]
    UnknownVariable {
        fragment: &'static str,
        variable: String,
    },
}

impl TemplateError {
    /// 出错片段的名称。
    pub fn fragment(&self) -> &'static str {
        match self {
            TemplateError::Unterminated { fragment, .. }
            | TemplateError::EmptyPlaceholder { fragment, .. }
            | TemplateError::UnknownVariable { fragment, .. } => fragment,
        }
    }
}

/// 读取或校验成员配置失败。
///
/// - **意图 (Why)**：解析器本身对良构输入是全函数，校验因此放在加载阶段，由调用方决定如何处理；
/// - **契约 (What)**：`Io` 与 `Parse` 保留底层错误作为 `source`，`Invalid` 指明字段与原因。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read member config `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse member config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid member config field `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
