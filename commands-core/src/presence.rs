//! 属性存在性（presence）判断
//!
//! “存在”指：非 null、非空白字符串、非空容器、`true`；数字总是存在。
//! `#[command]` 为每个属性生成 `<attr>_present()`，内部走 [`present`]。
//!
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

pub trait Presence {
    fn is_present(&self) -> bool;

    fn is_blank(&self) -> bool {
        !self.is_present()
    }
}

impl Presence for Value {
    fn is_present(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(_) => true,
            Value::String(s) => s.is_present(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
        }
    }
}

impl Presence for str {
    fn is_present(&self) -> bool {
        !self.trim().is_empty()
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        self.as_str().is_present()
    }
}

impl Presence for bool {
    fn is_present(&self) -> bool {
        *self
    }
}

impl<T: Presence> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(Presence::is_present)
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Presence for [T] {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V, S> Presence for HashMap<K, V, S> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<K, V> Presence for BTreeMap<K, V> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for Map<String, Value> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Presence + ?Sized> Presence for &T {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

impl<T: Presence + ?Sized> Presence for Box<T> {
    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

/// 任意可序列化属性的存在性，按其 JSON 形态判断
pub fn present<T: Serialize + ?Sized>(value: &T) -> bool {
    serde_json::to_value(value)
        .map(|v| v.is_present())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_and_containers() {
        assert!(!"".is_present());
        assert!(!"   ".is_present());
        assert!("x".is_present());
        assert!(!Vec::<u8>::new().is_present());
        assert!(vec![1].is_present());
        assert!(!None::<String>.is_present());
        assert!(!Some(String::new()).is_present());
        assert!(Some("x".to_string()).is_present());
    }

    #[test]
    fn json_values() {
        assert!(!json!(null).is_present());
        assert!(!json!(false).is_present());
        assert!(json!(0).is_present());
        assert!(!json!({}).is_present());
        assert!(json!({ "a": 1 }).is_present());
        assert!(json!(" a ").is_present());
    }

    #[test]
    fn present_uses_serialized_form() {
        #[derive(Serialize)]
        struct Deal {
            id: u32,
        }

        assert!(present(&Deal { id: 1 }));
        assert!(present(&1_i64));
        assert!(!present(""));
        assert!(!present(&Option::<u8>::None));
    }
}
