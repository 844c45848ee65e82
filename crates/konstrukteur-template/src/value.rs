/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template data values.
//!
//! A [`Value`] is the data context a template is rendered against: a nested
//! tree of mappings, ordered sequences and scalars. Content records usually
//! arrive as JSON, so `Value` converts from (and deserializes through)
//! `serde_json::Value`.

use serde::Deserialize;
use std::collections::HashMap;

/// A value that can be used as a render context.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum Value {
    /// A null/absent value.
    #[default]
    Null,

    /// A boolean value.
    Bool(bool),

    /// An integral number.
    Integer(i64),

    /// An integral number above `i64::MAX`.
    Unsigned(u64),

    /// A floating point number.
    Float(f64),

    /// A string value.
    String(String),

    /// An ordered sequence of values.
    List(Vec<Value>),

    /// A mapping of string keys to values.
    Map(HashMap<String, Value>),
}

impl Value {
    /// Build a mapping from key/value pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a sequence from values.
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Check if this value is "truthy" for sections and existence checks.
    ///
    /// Falsy: null, `false`, `0`, `0.0`, NaN, the empty string, the empty
    /// sequence and the empty mapping. Everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(n) => *n != 0,
            Value::Unsigned(n) => *n != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(m) => !m.is_empty(),
        }
    }

    /// Look up a key if this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            _ => None,
        }
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) | Value::Unsigned(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "sequence",
            Value::Map(_) => "mapping",
        }
    }

    /// Append the text form of this value to `out`.
    ///
    /// Sequences render their elements joined by `,`. Mappings have no text
    /// form; the offending kind is returned as the error.
    pub fn write_text(&self, out: &mut String) -> Result<(), &'static str> {
        match self {
            Value::Null => {}
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => out.push_str(&n.to_string()),
            Value::Unsigned(n) => out.push_str(&n.to_string()),
            // JSON notation keeps `1.0` and `1e21` as written
            Value::Float(f) => match serde_json::Number::from_f64(*f) {
                Some(number) => out.push_str(&number.to_string()),
                None => out.push_str(&f.to_string()),
            },
            Value::String(s) => out.push_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_text(out)?;
                }
            }
            Value::Map(_) => return Err(self.kind()),
        }
        Ok(())
    }

    /// The text form of this value, if it has one.
    pub fn to_text(&self) -> Result<String, &'static str> {
        let mut out = String::new();
        self.write_text(&mut out)?;
        Ok(out)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Unsigned(u)
                } else {
                    n.as_f64().map_or(Value::Null, Value::Float)
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Value::Unsigned(n), Value::Integer)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(m: HashMap<String, Value>) -> Self {
        Value::Map(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Bool(false).is_truthy());

        assert!(Value::Integer(3).is_truthy());
        assert!(Value::Integer(-1).is_truthy());
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Float(f64::NAN).is_truthy());
        assert!(Value::Float(0.5).is_truthy());

        assert!(Value::from("false").is_truthy());
        assert!(!Value::from("").is_truthy());

        assert!(Value::list([false]).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());

        assert!(Value::map([("key", Value::Null)]).is_truthy());
        assert!(!Value::Map(HashMap::new()).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({
            "title": "Hello",
            "count": 2,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "draft": false,
            "author": null
        }));

        assert_eq!(value.get("title"), Some(&Value::from("Hello")));
        assert_eq!(value.get("count"), Some(&Value::Integer(2)));
        assert_eq!(value.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(value.get("tags"), Some(&Value::list(["a", "b"])));
        assert_eq!(value.get("draft"), Some(&Value::Bool(false)));
        assert_eq!(value.get("author"), Some(&Value::Null));
        assert_eq!(value.get("missing"), None);
    }

    #[test]
    fn test_deserialize_through_json() {
        let value: Value = serde_json::from_str(r#"{"items": [{"n": 1}]}"#).unwrap();
        assert_eq!(
            value,
            Value::map([("items", Value::list([Value::map([("n", 1i64)])]))])
        );
    }

    #[test]
    fn test_text_form() {
        assert_eq!(Value::Null.to_text(), Ok(String::new()));
        assert_eq!(Value::Bool(true).to_text(), Ok("true".to_string()));
        assert_eq!(Value::Bool(false).to_text(), Ok("false".to_string()));
        assert_eq!(Value::Integer(42).to_text(), Ok("42".to_string()));
        assert_eq!(Value::Float(1.5).to_text(), Ok("1.5".to_string()));
        assert_eq!(Value::Float(1.0).to_text(), Ok("1.0".to_string()));
        assert_eq!(Value::Float(f64::NAN).to_text(), Ok("NaN".to_string()));
        assert_eq!(
            Value::Unsigned(u64::MAX).to_text(),
            Ok("18446744073709551615".to_string())
        );
        assert_eq!(Value::list([1i64, 2, 3]).to_text(), Ok("1,2,3".to_string()));
        assert_eq!(Value::map([("a", 1i64)]).to_text(), Err("mapping"));
        assert_eq!(
            Value::list([Value::map([("a", 1i64)])]).to_text(),
            Err("mapping")
        );
    }

    #[test]
    fn test_numbers_from_json() {
        let value = Value::from(json!({
            "whole": 1.0,
            "id": u64::MAX,
            "big": 1e21,
            "negative": -7
        }));
        assert_eq!(value.get("whole"), Some(&Value::Float(1.0)));
        assert_eq!(value.get("id"), Some(&Value::Unsigned(u64::MAX)));
        assert_eq!(value.get("negative"), Some(&Value::Integer(-7)));
        assert_eq!(value.get("big").unwrap().to_text(), Ok("1e21".to_string()));

        assert_eq!(Value::from(5u64), Value::Integer(5));
        assert_eq!(Value::from(u64::MAX), Value::Unsigned(u64::MAX));
        assert!(!Value::Unsigned(0).is_truthy());
    }

    #[test]
    fn test_get_on_non_mapping() {
        assert_eq!(Value::from("text").get("len"), None);
        assert_eq!(Value::Null.get("x"), None);
    }
}
