//! Identifier types used throughout flatstate.
//!
//! Entity ids come straight from the data, so they are either JSON strings or
//! JSON numbers. Tables are keyed by the id's string form, which makes `5` and
//! `"5"` address the same row.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{Error, Result, kind_name};

/// Identifier of an entity within its table.
///
/// Equality and hashing go through [`EntityId::key`], so a numeric id and its
/// string spelling are the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(Number),
    Text(String),
}

impl EntityId {
    /// Reads an id from a JSON scalar. Returns `None` for anything that is not
    /// a string or a number.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Like [`EntityId::from_value`], but reports what was found instead.
    pub fn try_from_value(value: &Value) -> Result<Self> {
        Self::from_value(value).ok_or_else(|| Error::InvalidId(kind_name(value).to_string()))
    }

    /// The id in its original JSON form, as it appears in a result skeleton.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Number(n.clone()),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// The table key for this id.
    #[must_use]
    pub fn key(&self) -> Cow<'_, str> {
        match self {
            Self::Number(n) => Cow::Owned(number_key(n)),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }
}

/// Integral floats are spelled as integers, so `1.0` keys the same row as `1`.
fn number_key(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl PartialEq for EntityId {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for EntityId {}

impl Hash for EntityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}
