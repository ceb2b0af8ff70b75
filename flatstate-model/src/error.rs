//! Error types for schema construction and validation.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised by an invalid schema declaration.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// An array was declared with zero or several element schemas.
    #[error("expected schema definition to be a single schema, but found {found}")]
    InvalidArrayDefinition { found: usize },

    /// A document referenced an entity it does not declare.
    #[error("unknown entity schema: {0}")]
    UnknownEntity(String),

    /// A polymorphic node declared neither a single schema nor keyed schemas.
    #[error("{kind} schema needs either `schema` or `schemas`")]
    IncompletePolymorphic { kind: String },

    /// Keyed schemas were declared without a discriminator attribute.
    #[error("{kind} schema declares `schemas` without an `attribute`")]
    MissingDiscriminator { kind: String },

    /// The document itself could not be parsed.
    #[error("invalid schema document: {0}")]
    Document(#[from] serde_json::Error),
}
