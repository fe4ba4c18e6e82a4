//! `serde_json::Value` → [`Value`] (feature `json`).
//!
//! Objects become `Map<str, dyn Any>`, arrays `Vec<dyn Any>`, `null` the
//! absent value. Numbers take the first of `i64`, `u64`, `f64` that holds
//! them, so `1` and `1.0` reflect to different types.

use crate::{Reflect, Type, Value};

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Invalid,
            serde_json::Value::Bool(b) => Self::from(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::from(i)
                } else if let Some(u) = n.as_u64() {
                    Self::from(u)
                } else {
                    // every non-integer JSON number is an f64
                    Self::from(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::from(s.as_str()),
            serde_json::Value::Array(items) => Self::list(items.iter().map(Self::from)),
            serde_json::Value::Object(fields) => Self::map(
                Type::Str,
                Type::Dyn,
                fields
                    .iter()
                    .map(|(k, v)| (Self::from(k.as_str()), Self::from(v))),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from(&json)
    }
}

impl Reflect for serde_json::Value {
    fn reflect_type() -> Type {
        Type::Dyn
    }

    fn reflect(&self) -> Value {
        Value::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{explain, matches, ops};
    use serde_json::json;

    #[test]
    fn test_conversion() {
        let v = Value::from(json!({"b": [1, "x", null], "a": 1.5}));
        assert_eq!(v.type_of(), Some(Type::map(Type::Str, Type::Dyn)));
        assert_eq!(v.to_string(), "{\"a\": 1.5, \"b\": [1, \"x\", nil]}");
        assert!(Value::from(json!(null)).is_invalid());
        assert_eq!(Value::from(json!(u64::MAX)).type_of(), Some(Type::U64));
    }

    #[test]
    fn test_json_documents() {
        let got = json!({"id": 7, "tags": ["a", "b"]});
        assert!(matches(&got, &got.clone()));
        let report = explain(&got, &json!({"id": 7, "tags": ["a", "c"]})).unwrap();
        assert_eq!(report.path, "DATA[\"tags\"][1]");
    }

    #[test]
    fn test_operators_inside_json_shape() {
        let got = Value::from(json!({"id": 7, "name": "bob"}));
        let expected = Value::map(
            Type::Str,
            Type::Dyn,
            [
                ("id".into(), ops::between(1_i64, 10_i64)),
                ("name".into(), ops::has_prefix("b")),
            ],
        );
        assert!(matches(&got, &expected));
    }
}
