//! 上报数据校验
//!
//! 把未定型的 JSON 转换为规范化的记录，或返回结构化的校验问题列表。
//! 所有函数都是纯函数：同一输入总是得到同一结果。

mod reader;
mod schemas;

use serde::Serialize;

pub use schemas::{EventBatch, validate_error, validate_event, validate_event_batch, validate_session};

/// 问题路径的一段：对象键或数组下标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// 缺失必填字段或 JSON 类型不符
    InvalidType,
    /// 字符串格式错误（UUID、时间戳）
    InvalidString,
    /// 数值超出范围
    InvalidNumber,
    /// 数组过长
    TooBig,
}

/// 单个字段的校验问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: Vec<PathSegment>,
    pub code: IssueCode,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: Vec<PathSegment>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path,
            code,
            message: message.into(),
        }
    }

    /// 便于日志输出的点分路径，如 `supported_abis.1`
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(|seg| match seg {
                PathSegment::Key(k) => k.clone(),
                PathSegment::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

pub type ValidationResult<T> = Result<T, Vec<ValidationIssue>>;
