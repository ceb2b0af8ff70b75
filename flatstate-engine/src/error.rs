//! Error types for the engine.

use flatstate_model::SchemaError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that abort a normalize or denormalize call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// `normalize` was handed something other than an object or array.
    #[error("unexpected input given to normalize: expected an object or array, found {found}")]
    InvalidInput { found: String },

    /// An entity value had no string or number id.
    ///
    /// Normalization stops here instead of filing the entity under a
    /// placeholder key, where unrelated id-less entities would merge into one
    /// row.
    #[error("entity of schema {schema} has no usable id")]
    MissingId { schema: String },

    /// The schema tree is malformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
