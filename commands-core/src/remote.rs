//! 远端错误合并
//!
//! 把外部服务返回的字段级错误并入命令自己的错误集合，
//! 属性名统一加上 [`REMOTE_PREFIX`] 前缀。
//!
//! 响应负载形如：
//! ```json
//! { "errors": { "service_order_state": [{ "error": "invalid" }],
//!               "service_order": ["invalid", "custom_error"],
//!               "deal": "taken" } }
//! ```
//! 负载缺失或结构不符时不产生任何错误；无法识别的条目被跳过（记录 debug 日志）。
//!
use serde_json::Value;

use crate::validation::Errors;

/// 远端错误属性名前缀
pub const REMOTE_PREFIX: &str = "remote_";

/// 外部响应
///
/// 负载优先取 `data()`，否则取 `body()`。
pub trait RemoteResponse {
    fn data(&self) -> Option<&Value> {
        None
    }

    fn body(&self) -> Option<&Value>;

    fn payload(&self) -> Option<&Value> {
        self.data().or_else(|| self.body())
    }
}

impl RemoteResponse for Value {
    fn body(&self) -> Option<&Value> {
        Some(self)
    }
}

impl<T: RemoteResponse + ?Sized> RemoteResponse for &T {
    fn data(&self) -> Option<&Value> {
        (**self).data()
    }

    fn body(&self) -> Option<&Value> {
        (**self).body()
    }
}

/// 合并远端错误，返回实际并入的条目数
pub fn merge_remote_errors<R: RemoteResponse + ?Sized>(errors: &mut Errors, response: &R) -> usize {
    let Some(Value::Object(fields)) = response.payload().and_then(|p| p.get("errors")) else {
        return 0;
    };

    let mut merged = 0;
    for (field, entries) in fields {
        let entries: &[Value] = match entries {
            Value::Array(items) => items.as_slice(),
            Value::Null => &[][..],
            single => std::slice::from_ref(single),
        };

        for entry in entries {
            match remote_error_code(entry) {
                Some(code) => {
                    errors.add(format!("{REMOTE_PREFIX}{field}"), code);
                    merged += 1;
                }
                None => {
                    tracing::debug!(field = %field, entry = %entry, "skipping malformed remote error entry");
                }
            }
        }
    }
    merged
}

fn remote_error_code(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(code) => Some(code),
        Value::Object(obj) => obj.get("error").and_then(Value::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Wrapped {
        data: Option<Value>,
        body: Value,
    }

    impl RemoteResponse for Wrapped {
        fn data(&self) -> Option<&Value> {
            self.data.as_ref()
        }

        fn body(&self) -> Option<&Value> {
            Some(&self.body)
        }
    }

    // 测试三种条目形态：结构化、字符串数组、单个字符串
    #[test]
    fn merges_all_entry_shapes() {
        let mut errors = Errors::new();
        let merged = merge_remote_errors(
            &mut errors,
            &json!({
                "errors": {
                    "service_order_state": [{ "error": "invalid" }],
                    "service_order": ["invalid", "custom_error"],
                    "deal": "taken",
                }
            }),
        );

        assert_eq!(merged, 4);
        assert_eq!(
            errors.attributes(),
            vec![
                "remote_service_order_state",
                "remote_service_order",
                "remote_deal"
            ]
        );
        assert_eq!(errors.get("remote_service_order").len(), 2);
    }

    // 测试缺失或畸形负载不产生错误
    #[test]
    fn tolerates_missing_and_malformed_payloads() {
        let mut errors = Errors::new();

        assert_eq!(merge_remote_errors(&mut errors, &json!({})), 0);
        assert_eq!(merge_remote_errors(&mut errors, &json!(null)), 0);
        assert_eq!(merge_remote_errors(&mut errors, &json!("oops")), 0);
        assert_eq!(merge_remote_errors(&mut errors, &json!({ "errors": [1] })), 0);
        assert_eq!(
            merge_remote_errors(
                &mut errors,
                &json!({ "errors": { "a": [1, { "code": "x" }, { "error": 3 }, null] } })
            ),
            0
        );

        assert!(errors.is_empty());
    }

    // 测试优先读取 data 负载
    #[test]
    fn prefers_data_over_body() {
        let response = Wrapped {
            data: Some(json!({ "errors": { "from_data": ["invalid"] } })),
            body: json!({ "errors": { "from_body": ["invalid"] } }),
        };

        let mut errors = Errors::new();
        merge_remote_errors(&mut errors, &response);
        assert!(errors.contains_key("remote_from_data"));
        assert!(!errors.contains_key("remote_from_body"));

        let response = Wrapped {
            data: None,
            body: json!({ "errors": { "from_body": ["invalid"] } }),
        };
        let mut errors = Errors::new();
        merge_remote_errors(&mut errors, &response);
        assert!(errors.contains_key("remote_from_body"));
    }
}
