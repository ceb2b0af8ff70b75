//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while building entity tables.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Data that does not have the `{ schema: { id: entity } }` shape.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
