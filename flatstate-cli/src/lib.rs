//! Command functions behind the `flatstate` binary.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use flatstate_engine::{denormalize, normalize};
use flatstate_model::{Schema, SchemaDocument};
use flatstate_store::EntityTables;
use serde_json::Value;
use tracing::{debug, info};

/// Reads a schema document and links it into a schema tree.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read schema document {}", path.display()))?;
    let document = SchemaDocument::from_json(&text).context("Failed to parse schema document")?;
    debug!(entities = document.entities.len(), "Loaded schema document");
    document.build().context("Failed to build schema")
}

pub fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// Normalizes `input`, returning `{ "entities": .., "result": .. }`.
pub fn run_normalize(schema: &Schema, input: &Value) -> Result<Value> {
    let normalized = normalize(input, schema).context("Normalization failed")?;
    info!(entities = normalized.entities.len(), "Normalized input");
    Ok(serde_json::to_value(normalized)?)
}

/// Rebuilds a tree from a result skeleton and entity tables. Without input,
/// or when the root reference is missing or deleted, the output is `null`.
pub fn run_denormalize(schema: &Schema, input: Option<&Value>, entities: Value) -> Result<Value> {
    let tables = EntityTables::from_value(entities).context("Invalid entity tables")?;
    let resolved = denormalize(input, schema, &tables).context("Denormalization failed")?;
    info!(
        absent = resolved.is_absent(),
        tombstone = resolved.is_tombstone(),
        "Denormalized input"
    );
    Ok(resolved.or_null())
}

pub fn render(value: &Value, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

/// Writes to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, format!("{rendered}\n")).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}
