//! Import and include extraction from workflow files.
//!
//! Dependencies are declared in two places:
//!
//! - Front matter: an `imports:` list whose entries are plain path strings
//!   or `{path, inputs}` objects. Any other shape for the list is treated as
//!   "no imports" rather than an error.
//! - Body: `@include path` / `@include? path` directives, one per line, with
//!   an optional `#section` suffix on the path. The serialized form
//!   `{{#import path}}` / `{{#import? path}}` is the same directive kind.
//!
//! Extraction is pure: it never touches the filesystem and never resolves
//! paths. References that are already workflowspec-shaped (contain `@`) pass
//! through untouched for the resolver and rewriter to discriminate.

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::core::MarkflowError;
use crate::markdown::split_frontmatter;

/// One `imports:` entry as written in front matter.
///
/// The two accepted shapes are modeled as one tagged variant: a bare path,
/// or a path with input bindings forwarded to the imported fragment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImportSpec {
    /// Plain path string.
    Path(String),
    /// `{path, inputs}` object form.
    WithInputs {
        /// Path of the imported fragment.
        path: String,
        /// Input bindings passed to the fragment, if any.
        #[serde(default)]
        inputs: Option<Mapping>,
    },
}

impl ImportSpec {
    /// The path component, whichever shape was written.
    pub fn path(&self) -> &str {
        match self {
            Self::Path(path) => path,
            Self::WithInputs { path, .. } => path,
        }
    }

    /// Input bindings, present only for the object form.
    pub fn inputs(&self) -> Option<&Mapping> {
        match self {
            Self::Path(_) => None,
            Self::WithInputs { inputs, .. } => inputs.as_ref(),
        }
    }
}

/// A single declared dependency edge, importer to dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportEdge {
    /// Path of the file declaring the dependency, as given to extraction.
    pub importer: String,
    /// Dependency path as written, section suffix stripped, unresolved.
    pub path: String,
    /// True for `@include?` / `{{#import? ...}}` declarations.
    pub optional: bool,
    /// Section name from a `#section` suffix, if one was written.
    pub section: Option<String>,
    /// Input bindings from the `{path, inputs}` front matter form.
    pub inputs: Option<Mapping>,
}

/// A body include directive, parsed from one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    /// File path component. Empty for pure `#Section` references.
    pub path: String,
    /// Section name, if the path embedded a `#section` suffix.
    pub section: Option<String>,
    /// True for the `?`-marked optional forms.
    pub optional: bool,
}

fn directive_regex() -> &'static Regex {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE.get_or_init(|| {
        Regex::new(r"^\s*(?:@include(\?)?[ \t]+(.+?)|\{\{#import(\?)?[ \t]+(.+?)\s*\}\})\s*$")
            .expect("directive regex is valid")
    })
}

/// Split a reference into its file path and optional `#section` suffix.
pub fn split_section(reference: &str) -> (String, Option<String>) {
    match reference.split_once('#') {
        Some((path, section)) if !section.is_empty() => {
            (path.to_string(), Some(section.to_string()))
        }
        Some((path, _)) => (path.to_string(), None),
        None => (reference.to_string(), None),
    }
}

/// Parse one line as an include directive.
///
/// Returns `None` for lines that are not directives. A directive whose file
/// component is empty (a pure `#Section` reference) still parses, with an
/// empty `path`; callers skip those when building edges.
pub fn parse_include_directive(line: &str) -> Option<IncludeDirective> {
    let captures = directive_regex().captures(line)?;

    let optional = captures.get(1).is_some() || captures.get(3).is_some();
    let reference = captures.get(2).or_else(|| captures.get(4))?.as_str();
    let (path, section) = split_section(reference);

    Some(IncludeDirective {
        path,
        section,
        optional,
    })
}

/// Read the `imports:` list out of a front matter map.
///
/// Any shape other than a list of strings and `{path, inputs}` objects
/// yields an empty list. That is the defensive default, not an error: a
/// workflow with a malformed imports list still compiles on its own.
pub fn frontmatter_imports(map: &Mapping) -> Vec<ImportSpec> {
    let Some(value) = map.get(Value::String("imports".into())) else {
        return Vec::new();
    };

    match serde_yaml::from_value::<Vec<ImportSpec>>(value.clone()) {
        Ok(specs) => specs,
        Err(err) => {
            tracing::debug!("ignoring imports list with unexpected shape: {err}");
            Vec::new()
        }
    }
}

/// Extract every import edge declared by a workflow file.
///
/// Collects front matter `imports:` entries and body `@include` directives,
/// splits off `#section` suffixes, flags optionality, and collapses
/// duplicate dependency paths (first declaration wins). Pure `#Section`
/// references contribute no edge.
///
/// # Errors
///
/// Returns [`MarkflowError::Frontmatter`] when the front matter block is
/// present but not valid YAML. That failure belongs to this file alone.
pub fn extract_imports(content: &str, file_path: &str) -> Result<Vec<ImportEdge>> {
    let (map, body) = split_frontmatter(content).map_err(|err| MarkflowError::Frontmatter {
        path: file_path.to_string(),
        reason: err.to_string(),
    })?;

    let mut edges = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    if let Some(map) = map.as_ref() {
        for spec in frontmatter_imports(map) {
            let (path, section) = split_section(spec.path());
            if path.is_empty() || !seen.insert(path.clone()) {
                continue;
            }
            edges.push(ImportEdge {
                importer: file_path.to_string(),
                path,
                optional: false,
                section,
                inputs: spec.inputs().cloned(),
            });
        }
    }

    for line in body.lines() {
        let Some(directive) = parse_include_directive(line) else {
            continue;
        };
        if directive.path.is_empty() || !seen.insert(directive.path.clone()) {
            continue;
        }
        edges.push(ImportEdge {
            importer: file_path.to_string(),
            path: directive.path,
            optional: directive.optional,
            section: directive.section,
            inputs: None,
        });
    }

    Ok(edges)
}
