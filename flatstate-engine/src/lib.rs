//! Schema-driven normalization for flatstate.
//!
//! [`normalize`] walks a nested JSON tree alongside a [`Schema`] and splits it
//! into entity tables plus a result skeleton that holds ids where entities
//! used to be. [`denormalize`] walks a skeleton against any [`EntitySource`]
//! and rebuilds the nested tree.
//!
//! ```
//! use flatstate_engine::{denormalize, normalize};
//! use flatstate_model::{EntitySchema, Schema};
//! use serde_json::json;
//!
//! let users = EntitySchema::new("users");
//! let posts = EntitySchema::builder("posts").field("author", &users).build();
//! let schema: Schema = posts.into();
//!
//! let input = json!({ "id": 1, "author": { "id": 5, "name": "A" } });
//! let normalized = normalize(&input, &schema).unwrap();
//! assert_eq!(normalized.result, json!(1));
//! assert_eq!(
//!     normalized.entities.clone().into_value(),
//!     json!({
//!         "posts": { "1": { "id": 1, "author": 5 } },
//!         "users": { "5": { "id": 5, "name": "A" } }
//!     })
//! );
//!
//! let rebuilt = denormalize(Some(&normalized.result), &schema, &normalized.entities).unwrap();
//! assert_eq!(rebuilt.into_value(), Some(input));
//! ```
//!
//! Both directions are synchronous and keep all transient state (visited
//! entities, resolution cache) in a per-call context.
//!
//! [`Schema`]: flatstate_model::Schema
//! [`EntitySource`]: flatstate_store::EntitySource

mod denormalize;
mod error;
mod normalize;
mod resolved;

pub use denormalize::denormalize;
pub use error::{EngineError, EngineResult};
pub use normalize::{Normalized, normalize};
pub use resolved::Resolved;
