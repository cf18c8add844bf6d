//! 命令属性（Attributes）
//!
//! 命令的构造输入是一个有序的 JSON 对象：
//! - 只保留命令声明过的属性名，未知键静默丢弃（上游多给字段不会报错）；
//! - 声明过但缺失的属性取 `Default` 值；
//! - 类型转换交给 serde，无法转换时返回 [`CommandError::Attributes`]。
//!
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CommandError, CommandResult};

/// 命令构造输入
pub type Attributes = Map<String, Value>;

/// 命令声明的属性集合
///
/// 通常由 `#[command]` 宏生成，无需手写。
pub trait CommandAttributes {
    /// 命令的稳定名称（用于日志、注册表查找）
    const COMMAND: &'static str;

    /// 声明过的属性名
    const NAMES: &'static [&'static str];

    fn is_declared(name: &str) -> bool {
        Self::NAMES.contains(&name)
    }
}

/// 过滤出已声明的属性
pub fn filter_known<A: CommandAttributes>(attributes: Attributes) -> Attributes {
    attributes
        .into_iter()
        .filter(|(name, _)| A::is_declared(name))
        .collect()
}

/// 合并参数：调用方 `options` 覆盖构建器产生的 `base`
pub fn merge_arguments(base: Attributes, options: Attributes) -> Attributes {
    let mut merged = base;
    for (name, value) in options {
        merged.insert(name, value);
    }
    merged
}

/// 可转换为 [`Attributes`] 的值（参数构建器的返回类型）
pub trait IntoAttributes {
    fn into_attributes(self) -> CommandResult<Attributes>;
}

impl IntoAttributes for Attributes {
    fn into_attributes(self) -> CommandResult<Attributes> {
        Ok(self)
    }
}

impl IntoAttributes for Value {
    fn into_attributes(self) -> CommandResult<Attributes> {
        match self {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Attributes::new()),
            other => Err(CommandError::InvalidArguments {
                reason: format!("expected an object, found {other}"),
            }),
        }
    }
}

impl IntoAttributes for () {
    fn into_attributes(self) -> CommandResult<Attributes> {
        Ok(Attributes::new())
    }
}

/// 将任意可序列化的值转换为属性（须序列化为对象）
pub fn to_attributes<T: Serialize + ?Sized>(value: &T) -> CommandResult<Attributes> {
    serde_json::to_value(value)?.into_attributes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Declared;

    impl CommandAttributes for Declared {
        const COMMAND: &'static str = "declared";
        const NAMES: &'static [&'static str] = &["attr1", "attr2"];
    }

    fn attrs(value: Value) -> Attributes {
        value.into_attributes().unwrap()
    }

    // 测试未知属性被静默丢弃
    #[test]
    fn filter_known_drops_unknown_keys() {
        let filtered = filter_known::<Declared>(attrs(json!({
            "attr1": 1,
            "attr2": "",
            "attr3": 3,
        })));

        assert_eq!(Value::Object(filtered), json!({ "attr1": 1, "attr2": "" }));
    }

    // 测试调用方参数优先
    #[test]
    fn caller_options_take_precedence() {
        let merged = merge_arguments(
            attrs(json!({ "attr1": "builder", "attr2": 2 })),
            attrs(json!({ "attr1": "caller" })),
        );

        assert_eq!(
            Value::Object(merged),
            json!({ "attr1": "caller", "attr2": 2 })
        );
    }

    // 测试非对象参数被拒绝
    #[test]
    fn non_object_arguments_are_rejected() {
        let err = json!([1, 2]).into_attributes().unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments { .. }));

        assert!(Value::Null.into_attributes().unwrap().is_empty());
        assert!(().into_attributes().unwrap().is_empty());
    }

    #[test]
    fn to_attributes_from_struct() {
        #[derive(Serialize)]
        struct Input {
            name: &'static str,
        }

        let out = to_attributes(&Input { name: "x" }).unwrap();
        assert_eq!(out.get("name"), Some(&json!("x")));
    }
}
