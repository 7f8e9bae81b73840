//! Dynamically typed values carried by requests and responses.
//!
//! A remote caller cannot know the Rust types behind a plugin method, so
//! arguments and results travel as `Value`. One variant matters to the
//! invocation protocol in particular:
//!
//! - `Binary`: raw bytes. An argument in this shape is assumed to be a
//!   `PluginObject` that the caller pre-serialized, and is decoded before
//!   the call.
//! - `Object`: a structured plugin value. It must never go on the wire as-is;
//!   a method result of this shape is serialized to `Binary` first.

use std::cell::Cell;
use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::tokens::{AccessToken, TransactionToken};

/// Nesting allowed when decoding a `Value` outside of a codec scope.
pub const DEFAULT_MAX_DEPTH: usize = 128;

// `remote = "Self"` turns the derives into inherent fns so the trait impls
// below can wrap them with the nesting check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    AccessToken(AccessToken),
    TransactionToken(TransactionToken),
    Object(PluginObject),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let _level = Level::descend()
            .map_err(|max| D::Error::custom(format!("value nesting exceeds {max} levels")))?;
        Value::deserialize(deserializer)
    }
}

/// 現在の decode のネスト状態（スレッドローカル）
///
/// bincode は再帰の上限を持たないので、深くネストした List を送られると
/// スタックを使い切ってプロセスごと落ちる。`Value` 1 段ごとに数えて止める。
#[derive(Debug, Clone, Copy)]
struct Nesting {
    depth: usize,
    max: usize,
    exceeded: bool,
}

thread_local! {
    static NESTING: Cell<Nesting> = const {
        Cell::new(Nesting {
            depth: 0,
            max: DEFAULT_MAX_DEPTH,
            exceeded: false,
        })
    };
}

/// One level of `Value` being decoded.
struct Level;

impl Level {
    fn descend() -> Result<Level, usize> {
        let mut n = NESTING.get();
        if n.depth >= n.max {
            n.exceeded = true;
            NESTING.set(n);
            return Err(n.max);
        }
        n.depth += 1;
        NESTING.set(n);
        Ok(Level)
    }
}

impl Drop for Level {
    fn drop(&mut self) {
        let mut n = NESTING.get();
        n.depth = n.depth.saturating_sub(1);
        NESTING.set(n);
    }
}

/// Decode scope with its own depth limit; restores the previous state on drop.
pub(crate) struct DepthScope {
    saved: Nesting,
}

impl DepthScope {
    pub(crate) fn enter(max: usize) -> Self {
        let saved = NESTING.get();
        NESTING.set(Nesting {
            depth: 0,
            max,
            exceeded: false,
        });
        Self { saved }
    }

    pub(crate) fn exceeded(&self) -> bool {
        NESTING.get().exceeded
    }
}

impl Drop for DepthScope {
    fn drop(&mut self) {
        NESTING.set(self.saved);
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&PluginObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Value::Binary(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
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

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Binary(bytes)
    }
}

impl From<PluginObject> for Value {
    fn from(obj: PluginObject) -> Self {
        Value::Object(obj)
    }
}

impl From<AccessToken> for Value {
    fn from(token: AccessToken) -> Self {
        Value::AccessToken(token)
    }
}

impl From<TransactionToken> for Value {
    fn from(token: TransactionToken) -> Self {
        Value::TransactionToken(token)
    }
}

/// A structured value that is opaque on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginObject {
    pub type_name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl PluginObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_expected_variants() {
        assert_eq!(Value::from("hi"), Value::String("hi".to_string()));
        assert_eq!(Value::from(7_i64).as_i64(), Some(7));
        assert!(Value::from(vec![1_u8, 2, 3]).is_binary());
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert!(Value::Null.is_null());
    }

    #[test]
    fn shallow_values_still_roundtrip_through_serde() {
        let value = Value::List(vec![Value::Map(BTreeMap::from([(
            "k".to_string(),
            Value::from(PluginObject::new("t").with_field("n", 1_i64)),
        )]))]);
        let s = serde_json::to_string(&value).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&s).unwrap(), value);
    }

    #[test]
    fn plugin_object_fields() {
        let obj = PluginObject::new("inventory.Item")
            .with_field("sku", "A-1")
            .with_field("count", 3_i64);

        assert_eq!(obj.field("sku"), Some(&Value::from("A-1")));
        assert_eq!(obj.field("missing"), None);

        let value = Value::from(obj.clone());
        assert_eq!(value.as_object(), Some(&obj));
    }
}
