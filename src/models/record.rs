//! 单个条目的数据模型

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 待处理条目：页面上一个地区元素的 id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(String);

impl WorkItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkItem {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WorkItem {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// 一个徽章组的原始键值（标题 → 页面文本）
pub type RawFieldSet = BTreeMap<String, String>;

/// 规范化后的键值（字段名 → 数值）
pub type FieldMap = BTreeMap<String, FieldValue>;

/// 规范化后的数值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
}

impl fmt::Display for FieldValue {
    /// 浮点数总是带小数点输出，重新规范化时仍得到浮点数
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => {
                let text = v.to_string();
                if v.is_finite() && !text.contains(['.', 'e', 'E']) {
                    write!(f, "{text}.0")
                } else {
                    f.write_str(&text)
                }
            }
        }
    }
}

/// 一个地区的完整记录
///
/// 创建后不再修改；`label` 即导出时的保留列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub label: String,
    pub fields: FieldMap,
}

impl NormalizedRecord {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fields: FieldMap::new(),
        }
    }

    /// 合并一个徽章组，同名字段后写入者覆盖
    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn get(&self, field: &str) -> Option<FieldValue> {
        self.fields.get(field).copied()
    }
}
