//! Markdown workflow file operations.
//!
//! This module splits workflow files into a YAML front matter map and a
//! markdown body, and reassembles them after the front matter has been
//! rewritten. Parsing goes through `gray_matter` with the YAML engine so the
//! delimiter handling matches what editors and static site generators do;
//! the structured map itself is a [`serde_yaml::Mapping`].
//!
//! Import and include extraction lives in the [`imports`] submodule.

pub mod imports;

use anyhow::Result;
use gray_matter::{Matter, engine::YAML};
use serde_yaml::{Mapping, Value};

/// Front matter keys emitted first when a file is re-serialized, in this
/// order. Remaining keys follow in their original map order.
const FIELD_PRIORITY: &[&str] =
    &["description", "on", "permissions", "network", "engine", "tools", "safe-outputs", "imports"];

/// Split content into an optional front matter map and the markdown body.
///
/// Returns `Ok((None, body))` when no front matter block is present.
/// Malformed YAML inside the delimiters is an error; callers decide whether
/// that fails the whole operation or only the file at hand.
///
/// Non-mapping front matter (a bare scalar or list) is treated as absent:
/// the file is still a valid workflow, it just declares nothing.
pub fn split_frontmatter(content: &str) -> Result<(Option<Mapping>, String)> {
    let matter = Matter::<YAML>::new();
    let parsed = matter.parse::<Value>(content)?;

    let map = match parsed.data {
        Some(Value::Mapping(map)) => Some(map),
        Some(_) | None => None,
    };

    Ok((map, parsed.content))
}

/// Serialize a front matter map with the fixed field-priority ordering.
///
/// Priority fields come first so published files diff predictably; every
/// other key keeps its original relative order.
pub fn serialize_frontmatter(map: &Mapping) -> Result<String> {
    let mut ordered = Mapping::new();

    for key in FIELD_PRIORITY {
        let key = Value::String((*key).to_string());
        if let Some(value) = map.get(&key) {
            ordered.insert(key, value.clone());
        }
    }
    for (key, value) in map {
        if !ordered.contains_key(key) {
            ordered.insert(key.clone(), value.clone());
        }
    }

    Ok(serde_yaml::to_string(&Value::Mapping(ordered))?)
}

/// Reassemble a workflow file from a front matter map and body.
///
/// With no front matter the body is returned as-is.
pub fn render_workflow(map: Option<&Mapping>, body: &str) -> Result<String> {
    match map {
        Some(map) => {
            let frontmatter = serialize_frontmatter(map)?;
            Ok(format!("---\n{frontmatter}---\n\n{}", body.trim_start_matches('\n')))
        }
        None => Ok(body.to_string()),
    }
}
