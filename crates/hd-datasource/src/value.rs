//! value representation
//!
//! Leaf data sources produce one of the following data types
//! - boolean (true/false)
//! - integer (signed, i64)
//! - double (f64)
//! - token (short identifier such as a node type or a terminal name)
//! - string (utf-8)
//! - asset path (unresolved, as authored)
//! - scene path and scene path array (relationship targets)
//! - matrix (4x4 double, see [Value::Matrix] for the convention)
//! - array ("list" of values)
//! - dictionary (order-preserving "map", where the key is of type string)
//!
//! Additionally:
//! - there is no `null` value. Absence is expressed one level up, as a missing data source.
//! - the only valid **implicit** conversion: every `integer` is also a `double`
use crate::{scene_path::ScenePath, token::Token};
use glam::DMat4;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// All possible value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(f64),
    Token(Token),
    String(String),
    AssetPath(String),
    Path(ScenePath),
    PathArray(Vec<ScenePath>),
    /// Transform in glam's column-vector convention: `parent * local` applies `local` first.
    Matrix(DMat4),
    Array(Vec<Value>),
    Dictionary(indexmap::IndexMap<String, Value>),
}

impl Value {
    /// Name of the variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Token(_) => "token",
            Value::String(_) => "string",
            Value::AssetPath(_) => "asset",
            Value::Path(_) => "path",
            Value::PathArray(_) => "path[]",
            Value::Matrix(_) => "matrix4d",
            Value::Array(_) => "array",
            Value::Dictionary(_) => "dictionary",
        }
    }

    pub fn get<T: FromValue>(&self) -> Option<T> {
        T::from_value(self)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<Token> for Value {
    fn from(value: Token) -> Self {
        Self::Token(value)
    }
}

impl From<ScenePath> for Value {
    fn from(value: ScenePath) -> Self {
        Self::Path(value)
    }
}

impl From<DMat4> for Value {
    fn from(value: DMat4) -> Self {
        Self::Matrix(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> From<indexmap::IndexMap<K, V>> for Value {
    fn from(value: indexmap::IndexMap<K, V>) -> Self {
        Value::Dictionary(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

/// Typed extraction out of a [Value]
///
/// Returns `None` on a type mismatch, callers decide whether that is worth a diagnostic.
pub trait FromValue: Sized {
    const TYPE_NAME: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "double";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for Token {
    const TYPE_NAME: &'static str = "token";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Token(t) => Some(t.clone()),
            _ => None,
        }
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) | Value::AssetPath(s) => Some(s.clone()),
            Value::Token(t) => Some(t.to_string()),
            _ => None,
        }
    }
}

impl FromValue for ScenePath {
    const TYPE_NAME: &'static str = "path";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Path(p) => Some(p.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<ScenePath> {
    const TYPE_NAME: &'static str = "path[]";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::PathArray(p) => Some(p.clone()),
            _ => None,
        }
    }
}

impl FromValue for DMat4 {
    const TYPE_NAME: &'static str = "matrix4d";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Matrix(m) => Some(*m),
            _ => None,
        }
    }
}

impl FromValue for indexmap::IndexMap<String, Value> {
    const TYPE_NAME: &'static str = "dictionary";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Dictionary(d) => Some(d.clone()),
            _ => None,
        }
    }
}

/// Plain text rendering, used when values are used as string metadata (e.g. registry lookups)
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Token(v) => write!(f, "{v}"),
            Value::String(v) | Value::AssetPath(v) => f.write_str(v),
            Value::Path(v) => write!(f, "{v}"),
            Value::PathArray(v) => {
                let joined: Vec<_> = v.iter().map(ScenePath::as_str).collect();
                write!(f, "[{}]", joined.join(", "))
            }
            Value::Matrix(m) => {
                let rows: Vec<_> = m
                    .to_cols_array_2d()
                    .iter()
                    .map(|row| format!("({}, {}, {}, {})", row[0], row[1], row[2], row[3]))
                    .collect();
                write!(f, "({})", rows.join(", "))
            }
            Value::Array(v) => {
                let items: Vec<_> = v.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Dictionary(d) => {
                let items: Vec<_> = d.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
        }
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Double(value) => serializer.serialize_f64(*value),
            Value::Token(value) => serializer.serialize_str(value),
            Value::String(value) | Value::AssetPath(value) => serializer.serialize_str(value),
            Value::Path(value) => serializer.serialize_str(value.as_str()),
            Value::PathArray(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element.as_str())?;
                }
                ser.end()
            }
            Value::Matrix(value) => {
                // glam storage order: each column of the column-vector form is a row of the
                // row-vector form, so this emits the familiar row-major layout (translation last)
                let mut ser = serializer.serialize_seq(Some(16))?;
                for element in value.to_cols_array() {
                    ser.serialize_element(&element)?;
                }
                ser.end()
            }
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Dictionary(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}
