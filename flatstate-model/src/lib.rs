//! Schema model for flatstate.
//!
//! Defines the declarative descriptors that tell the engine how to read a tree:
//! - [`EntitySchema`]: a uniquely identified record stored in a table
//! - [`ObjectSchema`]: a plain container with per-field sub-schemas
//! - [`ArraySchema`]: homogeneous or polymorphic repetition
//! - [`UnionSchema`]: a single value whose schema is picked by a discriminator
//! - [`ValuesSchema`]: a dictionary whose values share one (resolved) schema
//! - [`Polymorphic`]: the discriminator logic shared by arrays, unions and values
//!
//! [`Schema`] ties the variants together. Schemas can also be declared as JSON
//! through [`SchemaDocument`].

mod document;
mod entity;
mod error;
mod polymorphic;
mod schema;

pub use document::{EntityDeclaration, SchemaDocument, SchemaNode, TaggedNode};
pub use entity::{EntitySchema, EntitySchemaBuilder, IdFn, IdStrategy, MergeFn, MergeStrategy, ProcessFn};
pub use error::{SchemaError, SchemaResult};
pub use polymorphic::{Polymorphic, ResolveFn, SchemaAttribute};
pub use schema::{ArraySchema, ObjectSchema, Schema, UnionSchema, ValuesSchema};
