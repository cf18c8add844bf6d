//! 错误集合（Errors）
//!
//! 有序的多值映射：属性名 -> 结构化错误条目 `{ error, ..metadata }`。
//! - 以插入顺序保存，分组输出时保留每个属性首次出现的位置；
//! - 相同的（属性, 条目）只保留一份；
//! - 对象级错误挂在伪属性 [`BASE`] 上。
//!
//! 规则的求值交给外部校验框架（`validator`），这里只负责收集与合并。
//!
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// 对象级错误使用的伪属性名
pub const BASE: &str = "base";

// validator 存放对象级（schema）错误的键
const VALIDATOR_SCHEMA_KEY: &str = "__all__";

/// 结构化错误条目
///
/// 序列化为 `{ "error": code, ...metadata }`。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorDetail {
    pub error: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            error: code.into(),
            metadata: Map::new(),
        }
    }

    /// 追加一条元数据
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn code(&self) -> &str {
        &self.error
    }

    /// 转为 JSON 对象；元数据中的 `error` 键不会覆盖错误码
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("error".to_string(), Value::String(self.error.clone()));
        for (key, value) in &self.metadata {
            if key != "error" {
                obj.insert(key.clone(), value.clone());
            }
        }
        Value::Object(obj)
    }
}

/// 单条错误记录（属性名 + 条目）
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEntry {
    attribute: String,
    detail: ErrorDetail,
}

impl ErrorEntry {
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn detail(&self) -> &ErrorDetail {
        &self.detail
    }
}

/// 命令的错误集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Errors {
    entries: Vec<ErrorEntry>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在属性上添加一个错误码
    pub fn add(&mut self, attribute: impl Into<String>, code: impl Into<String>) {
        self.add_detail(attribute, ErrorDetail::new(code));
    }

    /// 在属性上添加带元数据的错误码
    pub fn add_with(
        &mut self,
        attribute: impl Into<String>,
        code: impl Into<String>,
        metadata: Map<String, Value>,
    ) {
        self.add_detail(
            attribute,
            ErrorDetail {
                error: code.into(),
                metadata,
            },
        );
    }

    /// 添加对象级错误
    pub fn add_to_base(&mut self, code: impl Into<String>) {
        self.add(BASE, code);
    }

    pub fn add_detail(&mut self, attribute: impl Into<String>, detail: ErrorDetail) {
        let entry = ErrorEntry {
            attribute: attribute.into(),
            detail,
        };
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.entries.iter()
    }

    /// 某个属性上的全部条目（按插入顺序）
    pub fn get(&self, attribute: &str) -> Vec<&ErrorDetail> {
        self.entries
            .iter()
            .filter(|e| e.attribute == attribute)
            .map(|e| &e.detail)
            .collect()
    }

    pub fn contains_key(&self, attribute: &str) -> bool {
        self.entries.iter().any(|e| e.attribute == attribute)
    }

    /// 出错的属性名（去重，保持首次出现顺序）
    pub fn attributes(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.attribute.as_str()) {
                seen.push(entry.attribute.as_str());
            }
        }
        seen
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 合并另一组错误
    pub fn merge(&mut self, other: &Errors) {
        for entry in &other.entries {
            self.add_detail(entry.attribute.clone(), entry.detail.clone());
        }
    }

    /// 合并 `validator` 产生的错误
    ///
    /// - 错误码取 `ValidationError::code`，`params` 与 `message` 放入元数据；
    /// - 嵌套结构与列表按路径展开：`address.city`、`items[0].name`；
    /// - 对象级（schema）错误挂在 [`BASE`] 上，嵌套时挂在所在路径上；
    /// - 字段与参数按名称排序，保证结果稳定。
    pub fn merge_validation(&mut self, errors: &ValidationErrors) {
        self.merge_validation_at(None, errors);
    }

    fn merge_validation_at(&mut self, prefix: Option<&str>, errors: &ValidationErrors) {
        let mut kinds: Vec<_> = errors.errors().iter().collect();
        kinds.sort_by(|a, b| a.0.cmp(b.0));

        for (field, kind) in kinds {
            let path = validation_path(prefix, field);
            match kind {
                ValidationErrorsKind::Field(errs) => {
                    for err in errs {
                        self.add_detail(path.clone(), validation_detail(err));
                    }
                }
                ValidationErrorsKind::Struct(inner) => {
                    self.merge_validation_at(Some(&path), inner);
                }
                ValidationErrorsKind::List(items) => {
                    for (index, inner) in items {
                        self.merge_validation_at(Some(&format!("{path}[{index}]")), inner);
                    }
                }
            }
        }
    }

    /// 按属性分组的 JSON 视图
    ///
    /// `{ attr => [{ error, ..metadata }, ...] }`，属性顺序为首次出现顺序。
    pub fn as_json(&self) -> Map<String, Value> {
        let mut groups: Vec<(&str, Vec<Value>)> = Vec::new();
        for entry in &self.entries {
            match groups
                .iter_mut()
                .find(|(attribute, _)| *attribute == entry.attribute)
            {
                Some((_, details)) => details.push(entry.detail.to_json()),
                None => groups.push((entry.attribute.as_str(), vec![entry.detail.to_json()])),
            }
        }

        groups
            .into_iter()
            .map(|(attribute, details)| (attribute.to_string(), Value::Array(details)))
            .collect()
    }

    /// 可读的错误描述：对象级错误只输出错误码，其余为 `attr code`
    pub fn full_messages(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                if e.attribute == BASE {
                    e.detail.error.clone()
                } else {
                    format!("{} {}", e.attribute, e.detail.error)
                }
            })
            .collect()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

impl Serialize for ErrorDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for Errors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_json().serialize(serializer)
    }
}

impl From<&ValidationErrors> for Errors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut out = Errors::new();
        out.merge_validation(errors);
        out
    }
}

fn validation_path(prefix: Option<&str>, field: &str) -> String {
    match (prefix, field == VALIDATOR_SCHEMA_KEY) {
        (None, true) => BASE.to_string(),
        (Some(prefix), true) => prefix.to_string(),
        (None, false) => field.to_string(),
        (Some(prefix), false) => format!("{prefix}.{field}"),
    }
}

fn validation_detail(err: &ValidationError) -> ErrorDetail {
    let mut params: Vec<(String, Value)> = err
        .params
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));

    let mut detail = ErrorDetail::new(err.code.to_string());
    detail.metadata.extend(params);
    if let Some(message) = &err.message {
        detail
            .metadata
            .insert("message".to_string(), Value::String(message.to_string()));
    }
    detail
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a ErrorEntry;
    type IntoIter = std::slice::Iter<'a, ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    // 测试分组输出保持首次出现顺序，且条目不含属性名
    #[test]
    fn as_json_groups_by_first_occurrence() {
        let mut errors = Errors::new();
        errors.add("b", "taken");
        errors.add("a", "blank");
        errors.add_with(
            "b",
            "too_short",
            json!({ "count": 3 }).as_object().cloned().unwrap_or_default(),
        );

        let grouped = Value::Object(errors.as_json());
        assert_eq!(
            grouped,
            json!({
                "b": [{ "error": "taken" }, { "error": "too_short", "count": 3 }],
                "a": [{ "error": "blank" }],
            })
        );

        let keys: Vec<_> = errors.as_json().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    // 测试相同条目只保留一份
    #[test]
    fn duplicate_entries_are_collapsed() {
        let mut errors = Errors::new();
        errors.add("attr1", "invalid");
        errors.add("attr1", "invalid");
        errors.add("attr1", "blank");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("attr1").len(), 2);
    }

    // 测试对象级错误与可读描述
    #[test]
    fn base_errors_and_full_messages() {
        let mut errors = Errors::new();
        errors.add_to_base("locked");
        errors.add("name", "blank");

        assert!(errors.contains_key(BASE));
        assert_eq!(errors.full_messages(), vec!["locked", "name blank"]);
        assert_eq!(errors.to_string(), "locked, name blank");
        assert_eq!(errors.attributes(), vec![BASE, "name"]);
    }

    // 测试合并与清空
    #[test]
    fn merge_and_clear() {
        let mut left = Errors::new();
        left.add("a", "x");
        let mut right = Errors::new();
        right.add("a", "x");
        right.add("b", "y");

        left.merge(&right);
        assert_eq!(left.len(), 2);

        left.clear();
        assert!(left.is_empty());
    }

    // 测试元数据中的 error 键不会覆盖错误码
    #[test]
    fn metadata_cannot_shadow_code() {
        let detail = ErrorDetail::new("invalid").with("error", "other").with("count", 2);
        assert_eq!(detail.to_json(), json!({ "error": "invalid", "count": 2 }));
    }

    #[derive(Validate)]
    struct SignUp {
        #[validate(length(min = 1))]
        name: String,
        #[validate(range(min = 18))]
        age: u32,
    }

    // 测试合并 validator 的字段错误
    #[test]
    fn merges_validator_errors() {
        let input = SignUp {
            name: String::new(),
            age: 3,
        };
        let Err(report) = input.validate() else {
            panic!("expected validation errors");
        };

        let errors = Errors::from(&report);
        assert_eq!(errors.attributes(), vec!["age", "name"]);
        assert_eq!(errors.get("name")[0].code(), "length");
        assert_eq!(errors.get("age")[0].code(), "range");
        assert!(errors.get("age")[0].metadata.contains_key("min"));
    }

    #[derive(Validate)]
    struct Line {
        #[validate(length(min = 1))]
        sku: String,
    }

    #[derive(Validate)]
    struct Address {
        #[validate(length(min = 1))]
        city: String,
    }

    #[derive(Validate)]
    #[validate(schema(function = "distinct_ends", skip_on_field_errors = false))]
    struct Shipment {
        origin: String,
        destination: String,
        #[validate(nested)]
        address: Address,
        #[validate(nested)]
        lines: Vec<Line>,
    }

    fn distinct_ends(shipment: &Shipment) -> Result<(), ValidationError> {
        if shipment.origin == shipment.destination {
            return Err(ValidationError::new("same"));
        }
        Ok(())
    }

    // 测试嵌套结构、列表与对象级错误的展开
    #[test]
    fn merges_nested_and_schema_errors() {
        let input = Shipment {
            origin: "sh".into(),
            destination: "sh".into(),
            address: Address {
                city: String::new(),
            },
            lines: vec![
                Line { sku: "a-1".into() },
                Line { sku: String::new() },
            ],
        };
        let Err(report) = input.validate() else {
            panic!("expected validation errors");
        };

        let errors = Errors::from(&report);
        assert_eq!(errors.get(BASE)[0].code(), "same");
        assert_eq!(errors.get("address.city")[0].code(), "length");
        assert_eq!(errors.get("lines[1].sku")[0].code(), "length");
        assert!(!errors.contains_key("__all__"));
        assert!(!errors.contains_key("lines[0].sku"));
        assert_eq!(errors.len(), 3);
    }

    // 测试错误条目的序列化不会产生重复的 error 键
    #[test]
    fn detail_serializes_like_to_json() {
        let detail = ErrorDetail::new("invalid").with("error", "other");
        let json = serde_json::to_string(&detail).unwrap();
        assert_eq!(json, r#"{"error":"invalid"}"#);
    }

    // 测试序列化与 as_json 一致
    #[test]
    fn serializes_as_grouped_json() {
        let mut errors = Errors::new();
        errors.add("attr1", "error message");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, json!({ "attr1": [{ "error": "error message" }] }));
    }
}
