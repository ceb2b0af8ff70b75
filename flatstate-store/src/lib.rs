//! Entity tables for flatstate.
//!
//! Normalization produces an [`EntityTables`]; denormalization reads entities
//! through the [`EntitySource`] capability, which is all it ever asks of a
//! container.
//!
//! # Architecture
//!
//! - [`EntityTables`] is the table set built by one normalize call, ordered by
//!   first insertion, and a plain nested mapping as far as lookups go
//! - `serde_json::Value` is a plain nested mapping too, so a parsed
//!   `{ "users": { "1": {..} } }` document can be denormalized against directly
//! - [`SharedTables`] is a persistent, structurally shared container. It is
//!   addressed by path, the way immutable collections usually are

mod error;
mod shared;
mod source;
mod tables;

pub use error::{StoreError, StoreResult};
pub use shared::SharedTables;
pub use source::EntitySource;
pub use tables::EntityTables;
