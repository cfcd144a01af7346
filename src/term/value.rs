//! Raw host values carried by [`Term::Raw`](super::Term::Raw).

use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{TermError, TermResult};

/// An opaque, ground value.
///
/// `Boxed` wraps a host value behind a shared lock: shallow copies of a term
/// share the box, [`Value::deep_copy`] allocates a fresh one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Value {
    /// Explicit "no value" marker; also used for unbound sentinels.
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    #[serde(skip)]
    Boxed(Arc<RwLock<Value>>),
}

impl Value {
    /// Wrap a value in a shared, mutable box.
    pub fn boxed(value: Value) -> Self {
        Value::Boxed(Arc::new(RwLock::new(value)))
    }

    /// Snapshot of the value with any box unwrapped.
    pub fn snapshot(&self) -> Value {
        match self {
            Value::Boxed(inner) => inner.read().expect("value lock poisoned").snapshot(),
            other => other.clone(),
        }
    }

    /// Independent copy: boxes are re-allocated, lists copied recursively.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::Boxed(inner) => {
                let copied = inner.read().expect("value lock poisoned").deep_copy();
                Value::boxed(copied)
            }
            Value::List(items) => Value::List(items.iter().map(Value::deep_copy).collect()),
            other => other.clone(),
        }
    }

    /// Replace the content of a box. Fails on non-boxed values.
    pub fn replace_boxed(&self, value: Value) -> TermResult<()> {
        match self {
            Value::Boxed(inner) => {
                *inner.write().expect("value lock poisoned") = value;
                Ok(())
            }
            other => Err(TermError::TypeMismatch {
                expected: "boxed".into(),
                found: other.type_name().into(),
            }),
        }
    }

    /// Hash that skips box content, which can change after the hash is taken.
    pub(crate) fn hash_stable<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Boxed(_) => 6u8.hash(state),
            Value::List(items) => {
                5u8.hash(state);
                items.len().hash(state);
                for item in items {
                    item.hash_stable(state);
                }
            }
            other => other.hash(state),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.snapshot(), Value::Empty)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Boxed(_) => "boxed",
        }
    }

    pub fn as_bool(&self) -> TermResult<bool> {
        match self.snapshot() {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }

    pub fn as_i64(&self) -> TermResult<i64> {
        match self.snapshot() {
            Value::Int(i) => Ok(i),
            other => Err(mismatch("int", &other)),
        }
    }

    /// Numeric view; ints widen to floats.
    pub fn as_f64(&self) -> TermResult<f64> {
        match self.snapshot() {
            Value::Int(i) => Ok(i as f64),
            Value::Float(f) => Ok(f),
            other => Err(mismatch("number", &other)),
        }
    }

    pub fn as_str(&self) -> TermResult<String> {
        match self.snapshot() {
            Value::Str(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self.snapshot(), Value::Int(_) | Value::Float(_))
    }

    /// Convert a JSON scalar or array. Objects are kept as their JSON text.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Empty,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(_) => Value::Str(json.to_string()),
        }
    }
}

fn mismatch(expected: &str, found: &Value) -> TermError {
    TermError::TypeMismatch {
        expected: expected.into(),
        found: found.type_name().into(),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boxed(a), Value::Boxed(b)) if Arc::ptr_eq(a, b) => true,
            (Value::Boxed(_), _) | (_, Value::Boxed(_)) => self.snapshot() == other.snapshot(),
            (Value::Empty, Value::Empty) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Boxed(_) => self.snapshot().hash(state),
            Value::Empty => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Value::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                3u8.hash(state);
                f.to_bits().hash(state);
            }
            Value::Str(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            Value::List(items) => {
                5u8.hash(state);
                items.hash(state);
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Boxed(_) => write!(f, "{}", self.snapshot()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
