//! 数值规范化服务 - 业务能力层
//!
//! 只负责把页面上的文本值转换为数字，不关心值来自哪个页面元素

use std::sync::LazyLock;

use regex::Regex;

use crate::error::NormalizeError;
use crate::models::{FieldMap, FieldValue, RawFieldSet};

/// 所有 Unicode 空白，包括用作千位分隔符的不换行空格
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const PERCENT_SUFFIX: &str = " %";

/// 规范化一个徽章组
///
/// - 删除所有空白
/// - 以 `%` 结尾时去掉 `%`，字段名追加 `" %"`
/// - 含小数分隔符时解析为浮点数，否则解析为整数
/// - 改名后与已有字段重名时报错，不静默覆盖
pub fn normalize(raw: &RawFieldSet) -> Result<FieldMap, NormalizeError> {
    let mut out = FieldMap::new();
    for (key, value) in raw {
        let (key, value) = normalize_pair(key, value)?;
        if out.contains_key(&key) {
            return Err(NormalizeError::DuplicateKey { key });
        }
        out.insert(key, value);
    }
    Ok(out)
}

/// 规范化单个键值
pub fn normalize_pair(key: &str, value: &str) -> Result<(String, FieldValue), NormalizeError> {
    let cleaned = WHITESPACE.replace_all(value, "");

    let (key, number) = match cleaned.strip_suffix('%') {
        Some(number) => (format!("{key}{PERCENT_SUFFIX}"), number),
        None => (key.to_string(), cleaned.as_ref()),
    };

    let parsed = parse_number(number).ok_or_else(|| NormalizeError::MalformedValue {
        key: key.clone(),
        value: value.to_string(),
    })?;

    Ok((key, parsed))
}

/// 把已经规范化的记录按文本重新走一遍规范化
///
/// 对 `normalize` 的输出调用时结果不变
pub fn renormalize(fields: &FieldMap) -> Result<FieldMap, NormalizeError> {
    fields
        .iter()
        .map(|(key, value)| {
            let (_, value) = normalize_pair(key, &value.to_string())?;
            Ok((key.clone(), value))
        })
        .collect()
}

fn parse_number(text: &str) -> Option<FieldValue> {
    if text.is_empty() {
        return None;
    }

    // 页面上的负号可能是 U+2212
    let text = text.replace('\u{2212}', "-");

    if text.contains('.') {
        return parse_float(&text);
    }
    if text.contains(',') {
        return parse_float(&text.replace(',', "."));
    }
    if let Ok(v) = text.parse::<i64>() {
        return Some(FieldValue::Int(v));
    }
    // 超出 i64 范围的整数按浮点数保存
    let digits = text.strip_prefix(['-', '+']).unwrap_or(&text);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return parse_float(&text);
    }
    None
}

fn parse_float(text: &str) -> Option<FieldValue> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(FieldValue::Float)
}
