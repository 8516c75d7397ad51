//! 逐字段读取 JSON 对象并收集问题

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{IssueCode, PathSegment, ValidationIssue};

/// JSON 值的类型名，用于 "Expected X, received Y"
pub(super) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(super) struct FieldReader<'a> {
    obj: &'a Map<String, Value>,
    issues: Vec<ValidationIssue>,
}

impl<'a> FieldReader<'a> {
    /// 根节点必须是对象
    pub fn object(value: &'a Value) -> Result<Self, Vec<ValidationIssue>> {
        match value {
            Value::Object(obj) => Ok(Self {
                obj,
                issues: Vec::new(),
            }),
            other => Err(vec![ValidationIssue::new(
                Vec::new(),
                IssueCode::InvalidType,
                format!("Expected object, received {}", type_name(other)),
            )]),
        }
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    fn push(&mut self, path: Vec<PathSegment>, code: IssueCode, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(path, code, message));
    }

    fn expected(&mut self, key: &str, expected: &str, got: &Value) {
        self.push(
            vec![key.into()],
            IssueCode::InvalidType,
            format!("Expected {}, received {}", expected, type_name(got)),
        );
    }

    /// 必填字段：缺失记一条 "Required"
    fn required(&mut self, key: &str) -> Option<&'a Value> {
        match self.obj.get(key) {
            Some(v) => Some(v),
            None => {
                self.push(vec![key.into()], IssueCode::InvalidType, "Required");
                None
            }
        }
    }

    /// 可选字段：缺失与 null 等价
    fn optional(&self, key: &str) -> Option<&'a Value> {
        self.obj.get(key).filter(|v| !v.is_null())
    }

    fn as_string(&mut self, key: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.expected(key, "string", other);
                None
            }
        }
    }

    pub fn required_str(&mut self, key: &str) -> Option<String> {
        let value = self.required(key)?;
        self.as_string(key, value)
    }

    pub fn optional_str(&mut self, key: &str) -> Option<String> {
        let value = self.optional(key)?;
        self.as_string(key, value)
    }

    pub fn required_uuid(&mut self, key: &str) -> Option<Uuid> {
        let raw = self.required_str(key)?;
        match Uuid::parse_str(&raw) {
            // 仅接受带连字符的标准格式
            Ok(id) if raw.len() == 36 => Some(id),
            _ => {
                self.push(vec![key.into()], IssueCode::InvalidString, "Invalid uuid");
                None
            }
        }
    }

    /// RFC 3339 时间，带 `Z` 或数字时区偏移，统一转换为 UTC
    pub fn required_timestamp(&mut self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.required_str(key)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(_) => {
                self.push(vec![key.into()], IssueCode::InvalidString, "Invalid datetime");
                None
            }
        }
    }

    /// 整数字段，必须是整数值且在目标类型范围内（`3.0` 视为整数）
    pub fn optional_int<T>(&mut self, key: &str) -> Option<T>
    where
        T: TryFrom<i64>,
    {
        let value = self.optional(key)?;
        let Value::Number(n) = value else {
            self.expected(key, "number", value);
            return None;
        };

        let as_int = n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        });

        match as_int {
            Some(i) => match T::try_from(i) {
                Ok(v) => Some(v),
                Err(_) => {
                    self.push(
                        vec![key.into()],
                        IssueCode::InvalidNumber,
                        format!("Integer {} is out of range", i),
                    );
                    None
                }
            },
            None if n.as_f64().is_some_and(|f| f.fract() == 0.0) => {
                self.push(
                    vec![key.into()],
                    IssueCode::InvalidNumber,
                    "Integer is out of range",
                );
                None
            }
            None => {
                self.push(
                    vec![key.into()],
                    IssueCode::InvalidType,
                    "Expected integer, received float",
                );
                None
            }
        }
    }

    pub fn optional_f64(&mut self, key: &str) -> Option<f64> {
        let value = self.optional(key)?;
        match value.as_f64() {
            Some(f) if f.is_finite() => Some(f),
            Some(_) => {
                self.push(vec![key.into()], IssueCode::InvalidNumber, "Number must be finite");
                None
            }
            None => {
                self.expected(key, "number", value);
                None
            }
        }
    }

    pub fn optional_bool(&mut self, key: &str) -> Option<bool> {
        let value = self.optional(key)?;
        match value {
            Value::Bool(b) => Some(*b),
            other => {
                self.expected(key, "boolean", other);
                None
            }
        }
    }

    /// 字符串数组，非字符串元素的问题路径包含下标
    pub fn optional_string_list(&mut self, key: &str) -> Option<Vec<String>> {
        let value = self.optional(key)?;
        let Value::Array(items) = value else {
            self.expected(key, "array", value);
            return None;
        };

        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (idx, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => out.push(s.clone()),
                other => {
                    ok = false;
                    self.push(
                        vec![key.into(), idx.into()],
                        IssueCode::InvalidType,
                        format!("Expected string, received {}", type_name(other)),
                    );
                }
            }
        }
        ok.then_some(out)
    }

    pub fn optional_object(&mut self, key: &str) -> Option<Map<String, Value>> {
        let value = self.optional(key)?;
        match value {
            Value::Object(map) => Some(map.clone()),
            other => {
                self.expected(key, "object", other);
                None
            }
        }
    }

    pub fn required_array(&mut self, key: &str) -> Option<&'a [Value]> {
        let value = self.required(key)?;
        match value {
            Value::Array(items) => Some(items.as_slice()),
            other => {
                self.expected(key, "array", other);
                None
            }
        }
    }

    pub fn too_big(&mut self, key: &str, max: usize) {
        self.push(
            vec![key.into()],
            IssueCode::TooBig,
            format!("Array must contain at most {} element(s)", max),
        );
    }
}
