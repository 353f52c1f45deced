//! 具名脚本片段与最小化的 `{{ variable }}` 替换引擎。
//!
//! # 教案式说明
//! - **意图（Why）**：启动脚本由若干静态片段拼接而成，片段只需要“按名替换”，不需要条件或循环；
//!   条件分支全部在编排器的 Rust 代码中决定，模板本身保持无逻辑；
//! - **逻辑（How）**：先把片段切分为文本段与变量段，再用 [`Bindings`] 逐一替换；
//!   `{{` 之外的文本原样保留，因此 shell 的 `${VAR}`、`$((expr))` 不受影响；
//! - **契约（What）**：未闭合的 `{{`、空占位符、未绑定变量都返回 [`TemplateError`]，且不产生任何部分输出；
//! - **权衡（Trade-offs）**：不支持转义字面量 `{{`，现有片段中没有这种需求。

use std::collections::BTreeMap;

use crate::error::TemplateError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// 进程级只读的具名脚本片段。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fragment {
    name: &'static str,
    text: &'static str,
}

/// 片段切分后的单元。
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Variable(&'a str),
}

impl Fragment {
    pub const fn new(name: &'static str, text: &'static str) -> Self {
        Self { name, text }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 片段原文。
    pub fn text(&self) -> &'static str {
        self.text
    }

    /// 按出现顺序列出片段引用的变量（可能重复）。
    pub fn variables(&self) -> Result<Vec<&'static str>, TemplateError> {
        Ok(self
            .parse()?
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Variable(name) => Some(name),
                Segment::Text(_) => None,
            })
            .collect())
    }

    /// 用给定绑定替换所有占位符。
    ///
    /// 任一变量缺失时整体失败，调用方拿不到半替换的文本。
    pub fn render(&self, bindings: &Bindings) -> Result<String, TemplateError> {
        let segments = self.parse()?;
        let mut rendered = String::with_capacity(self.text.len());
        for segment in segments {
            match segment {
                Segment::Text(text) => rendered.push_str(text),
                Segment::Variable(name) => {
                    let value =
                        bindings
                            .get(name)
                            .ok_or_else(|| TemplateError::UnknownVariable {
                                fragment: self.name,
                                variable: name.to_owned(),
                            })?;
                    rendered.push_str(value);
                }
            }
        }
        Ok(rendered)
    }

    fn parse(&self) -> Result<Vec<Segment<'static>>, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = self.text;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Text(&rest[..start]));
            }
            let body_start = start + OPEN.len();
            let Some(body_len) = rest[body_start..].find(CLOSE) else {
                return Err(TemplateError::Unterminated {
                    fragment: self.name,
                    offset: offset + start,
                });
            };
            let name = rest[body_start..body_start + body_len].trim();
            if name.is_empty() {
                return Err(TemplateError::EmptyPlaceholder {
                    fragment: self.name,
                    offset: offset + start,
                });
            }
            segments.push(Segment::Variable(name));

            let consumed = body_start + body_len + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest));
        }
        Ok(segments)
    }
}

/// 一次渲染的变量绑定表。
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    values: BTreeMap<&'static str, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定变量，返回自身便于链式调用；重复绑定时后者覆盖前者。
    pub fn bind(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}
