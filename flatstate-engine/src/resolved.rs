use serde_json::Value;

/// Outcome of denormalizing one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A reconstructed value. `null` is a legitimate value here.
    Value(Value),
    /// Nothing to reconstruct: no input, or a reference to an entity that is
    /// not in the source.
    Absent,
    /// A reference to an entity flagged as deleted.
    Tombstone,
}

impl Resolved {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Tombstone => None,
        }
    }

    /// The value, with absent and deleted references collapsed to `null`.
    /// This is what an object field holds after denormalization.
    pub fn or_null(self) -> Value {
        self.into_value().unwrap_or(Value::Null)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, Self::Tombstone)
    }
}
