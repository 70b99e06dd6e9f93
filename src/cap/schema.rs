//! Validation of generic XML value trees into typed records.
//!
//! Records implement [`FromNode`] and read their fields through [`Fields`]. Every
//! failure carries the dotted path of the offending field (`alert.info[1].area.circle`),
//! and validation stops at the first one.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::util::parse_date;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{path}: required field is missing")]
    Missing { path: String },
    #[error("{path}: expected {expected}, found {found}")]
    Type {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{path}: `{value}` is not a valid {field}")]
    Enum {
        path: String,
        field: &'static str,
        value: String,
    },
    #[error("{path}: `{value}` is not a recognizable date")]
    Date { path: String, value: String },
    #[error("{path}: `{value}` is not a valid {pattern}")]
    Pattern {
        path: String,
        pattern: &'static str,
        value: String,
    },
}

impl ValidationError {
    pub fn path(&self) -> &str {
        match self {
            ValidationError::Missing { path }
            | ValidationError::Type { path, .. }
            | ValidationError::Enum { path, .. }
            | ValidationError::Date { path, .. }
            | ValidationError::Pattern { path, .. } => path,
        }
    }
}

pub trait FromNode: Sized {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError>;
}

/// The single place where "one value or an array of values" is resolved.
pub fn one_or_many(node: &Value) -> &[Value] {
    match node {
        Value::Array(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    }
}

fn many_from_node<T: FromNode>(node: &Value, path: &str) -> Result<Vec<T>, ValidationError> {
    let indexed = node.is_array();
    one_or_many(node)
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if indexed {
                T::from_node(item, &format!("{}[{}]", path, index))
            } else {
                T::from_node(item, path)
            }
        })
        .collect()
}

pub fn kind(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Field accessor over one object node.
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: &'a str,
}

impl<'a> Fields<'a> {
    pub fn new(node: &'a Value, path: &'a str) -> Result<Self, ValidationError> {
        match node {
            Value::Object(map) => Ok(Self { map, path }),
            other => Err(ValidationError::Type {
                path: path.to_string(),
                expected: "object",
                found: kind(other),
            }),
        }
    }

    pub fn path(&self) -> &str {
        self.path
    }

    pub fn required<T: FromNode>(&self, key: &str) -> Result<T, ValidationError> {
        let path = child_path(self.path, key);
        match self.map.get(key) {
            Some(node) => T::from_node(node, &path),
            None => Err(ValidationError::Missing { path }),
        }
    }

    pub fn optional<T: FromNode>(&self, key: &str) -> Result<Option<T>, ValidationError> {
        match self.map.get(key) {
            Some(node) => T::from_node(node, &child_path(self.path, key)).map(Some),
            None => Ok(None),
        }
    }

    /// A required field that may hold one value or an array of them.
    pub fn many<T: FromNode>(&self, key: &str) -> Result<Vec<T>, ValidationError> {
        let path = child_path(self.path, key);
        match self.map.get(key) {
            Some(node) => many_from_node(node, &path),
            None => Err(ValidationError::Missing { path }),
        }
    }

    /// Like [`Fields::many`], but an absent field is an empty list.
    pub fn optional_many<T: FromNode>(&self, key: &str) -> Result<Vec<T>, ValidationError> {
        match self.map.get(key) {
            Some(node) => many_from_node(node, &child_path(self.path, key)),
            None => Ok(Vec::new()),
        }
    }

    /// A field that only counts when it is an array. Absent or single values yield
    /// an empty list.
    pub fn list<T: FromNode>(&self, key: &str) -> Result<Vec<T>, ValidationError> {
        match self.map.get(key) {
            Some(node @ Value::Array(_)) => many_from_node(node, &child_path(self.path, key)),
            _ => Ok(Vec::new()),
        }
    }

    /// Runs `f` against the object stored under `key`.
    pub fn nested<T, F>(&self, key: &str, f: F) -> Result<T, ValidationError>
    where
        F: FnOnce(&Fields<'_>) -> Result<T, ValidationError>,
    {
        let path = child_path(self.path, key);
        let node = self
            .map
            .get(key)
            .ok_or_else(|| ValidationError::Missing { path: path.clone() })?;
        let fields = Fields::new(node, &path)?;
        f(&fields)
    }
}

/// Leaf text. Numbers are accepted because the XML reader turns numeric text into numbers.
pub fn text(node: &Value, path: &str) -> Result<String, ValidationError> {
    match node {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ValidationError::Type {
            path: path.to_string(),
            expected: "string",
            found: kind(other),
        }),
    }
}

impl FromNode for String {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        text(node, path)
    }
}

impl FromNode for f64 {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let type_error = |found| ValidationError::Type {
            path: path.to_string(),
            expected: "number",
            found,
        };
        match node {
            Value::Number(n) => n.as_f64().ok_or_else(|| type_error("number")),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| type_error("string")),
            other => Err(type_error(kind(other))),
        }
    }
}

impl FromNode for DateTime<Utc> {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let value = text(node, path)?;
        parse_date(&value).ok_or_else(|| ValidationError::Date {
            path: path.to_string(),
            value,
        })
    }
}

/// Declares a closed CAP vocabulary: the enum, its exact wire strings, and validation.
macro_rules! cap_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$variant_meta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::cap::schema::FromNode for $name {
            fn from_node(
                node: &serde_json::Value,
                path: &str,
            ) -> Result<Self, $crate::cap::schema::ValidationError> {
                let value = $crate::cap::schema::text(node, path)?;
                $name::parse(&value).ok_or_else(|| $crate::cap::schema::ValidationError::Enum {
                    path: path.to_string(),
                    field: $field,
                    value,
                })
            }
        }
    };
}

pub(crate) use cap_vocabulary;

static LANGUAGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}(?:-[A-Za-z]{2,3})?$").expect("valid language tag regex"));

static CIRCLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d+(?:\.\d+)?),(-?\d+(?:\.\d+)?) (-?\d+(?:\.\d+)?)$").expect("valid circle regex")
});

/// RFC 3066 style tag such as `en`, `en-US` or `fr-CA`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromNode for LanguageTag {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let value = text(node, path)?;
        if LANGUAGE_TAG.is_match(&value) {
            Ok(LanguageTag(value))
        } else {
            Err(ValidationError::Pattern {
                path: path.to_string(),
                pattern: "language tag",
                value,
            })
        }
    }
}

/// CAP circle: centre point and radius in kilometres, written `lat,lng radius`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

impl FromNode for Circle {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let value = text(node, path)?;
        let invalid = || ValidationError::Pattern {
            path: path.to_string(),
            pattern: "circle (`lat,lng radius`)",
            value: value.clone(),
        };
        let captures = CIRCLE.captures(&value).ok_or_else(invalid)?;
        let number = |index: usize| {
            captures
                .get(index)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .ok_or_else(invalid)
        };
        Ok(Circle {
            latitude: number(1)?,
            longitude: number(2)?,
            radius_km: number(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_or_many_normalizes() {
        let single = json!({"a": 1});
        let many = json!([{"a": 1}, {"a": 2}]);
        assert_eq!(one_or_many(&single), &[json!({"a": 1})]);
        assert_eq!(one_or_many(&many).len(), 2);
        assert!(one_or_many(&json!([])).is_empty());
    }

    #[test]
    fn test_many_paths_are_indexed_only_for_arrays() {
        let node = json!({"polygon": ["1,2 3,4", {"nested": true}]});
        let fields = Fields::new(&node, "area").unwrap();
        let err = fields.many::<String>("polygon").unwrap_err();
        assert_eq!(err.path(), "area.polygon[1]");

        let node = json!({"polygon": {"nested": true}});
        let fields = Fields::new(&node, "area").unwrap();
        let err = fields.many::<String>("polygon").unwrap_err();
        assert_eq!(err.path(), "area.polygon");
    }

    #[test]
    fn test_required_optional_and_missing() {
        let node = json!({"areaDesc": "Coast", "altitude": "120.5"});
        let fields = Fields::new(&node, "").unwrap();
        assert_eq!(fields.required::<String>("areaDesc").unwrap(), "Coast");
        assert_eq!(fields.optional::<f64>("altitude").unwrap(), Some(120.5));
        assert_eq!(fields.optional::<f64>("ceiling").unwrap(), None);
        assert_eq!(
            fields.required::<String>("event"),
            Err(ValidationError::Missing {
                path: "event".to_string()
            })
        );
        assert!(fields.optional_many::<String>("polygon").unwrap().is_empty());
    }

    #[test]
    fn test_list_only_accepts_arrays() {
        let node = json!({"item": ["a", "b"], "single": "a"});
        let fields = Fields::new(&node, "channel").unwrap();
        assert_eq!(fields.list::<String>("item").unwrap(), vec!["a", "b"]);
        assert!(fields.list::<String>("single").unwrap().is_empty());
        assert!(fields.list::<String>("absent").unwrap().is_empty());

        let node = json!({"item": ["a", {"nested": true}]});
        let fields = Fields::new(&node, "channel").unwrap();
        assert_eq!(fields.list::<String>("item").unwrap_err().path(), "channel.item[1]");
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let err = Fields::new(&json!("text"), "alert.info").err().unwrap();
        assert_eq!(
            err,
            ValidationError::Type {
                path: "alert.info".to_string(),
                expected: "object",
                found: "string"
            }
        );
        assert!(f64::from_node(&json!("NaN"), "x").is_err());
        assert_eq!(String::from_node(&json!(42), "x").unwrap(), "42");
    }

    #[test]
    fn test_language_tags() {
        for ok in ["en", "fr-CA", "en-us", "haw"] {
            assert!(LanguageTag::from_node(&json!(ok), "language").is_ok(), "{}", ok);
        }
        for bad in ["EN", "english", "e", "en_US", "en-", "en-USAX", ""] {
            assert!(LanguageTag::from_node(&json!(bad), "language").is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_circle() {
        let circle = Circle::from_node(&json!("45.5,-122.25 10"), "circle").unwrap();
        assert_eq!(
            circle,
            Circle {
                latitude: 45.5,
                longitude: -122.25,
                radius_km: 10.0
            }
        );
        for bad in ["45.5,-122.25", "45.5 -122.25 10", "45.5,-122.25  10", "a,b c"] {
            assert!(matches!(
                Circle::from_node(&json!(bad), "circle"),
                Err(ValidationError::Pattern { .. })
            ));
        }
    }

    #[test]
    fn test_dates() {
        assert!(DateTime::<Utc>::from_node(&json!("2024-03-01T12:30:00-04:00"), "sent").is_ok());
        assert!(matches!(
            DateTime::<Utc>::from_node(&json!("yesterday"), "sent"),
            Err(ValidationError::Date { .. })
        ));
    }
}
