//! Core type definitions for flatstate.
//!
//! This crate defines the small, schema-agnostic types shared by the rest of
//! the workspace:
//! - Entity identifiers (string or number, as found in the data)
//! - JSON truthiness, used for deletion flags
//! - Property order, used wherever an object is walked as a sequence
//!
//! Schema variants live in `flatstate-model`, entity tables in
//! `flatstate-store`, and the transform itself in `flatstate-engine`.

mod ids;
mod keys;
mod truthy;

pub use ids::EntityId;
pub use keys::property_order;
pub use truthy::{is_structural, is_truthy, kind_name};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid entity id: expected a string or number, found {0}")]
    InvalidId(String),
}
